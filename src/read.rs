//! A sequencing read with its per-base position and direction maps.

use crate::alignment_record::{
    AlignmentRecord, FIRST_READ_COUNT_TAG, SECOND_READ_COUNT_TAG, STITCHED_CIGAR_TAG,
};
use crate::cigar::{Cigar, CigarKind, CigarParseErr};
use std::fmt;

/// Position-map value for bases without a reference position (insertions, soft-clips)
pub const UNMAPPED: i32 = -1;

#[derive(Debug)]
pub enum ReadErr {
    Validation(String),
    Operation(String),
    Format(CigarParseErr),
}

impl fmt::Display for ReadErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadErr::Validation(msg) => write!(f, "Invalid read: {}", msg),
            ReadErr::Operation(msg) => write!(f, "{}", msg),
            ReadErr::Format(e) => write!(f, "Invalid stitched CIGAR tag: {}", e),
        }
    }
}

impl std::error::Error for ReadErr {}

impl From<CigarParseErr> for ReadErr {
    fn from(e: CigarParseErr) -> Self {
        ReadErr::Format(e)
    }
}

/// Which read a base's evidence comes from
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DirectionType {
    #[default]
    Forward,
    Reverse,
    Stitched,
}

impl DirectionType {
    pub fn as_char(self) -> char {
        match self {
            DirectionType::Forward => 'F',
            DirectionType::Reverse => 'R',
            DirectionType::Stitched => 'S',
        }
    }
}

/// Run-length direction string, e.g. `2R:4S:4F`
pub fn direction_string(directions: &[DirectionType]) -> String {
    let mut runs: Vec<(usize, DirectionType)> = Vec::new();
    for &direction in directions {
        match runs.last_mut() {
            Some((count, last)) if *last == direction => *count += 1,
            _ => runs.push((1, direction)),
        }
    }
    runs.iter()
        .map(|(count, direction)| format!("{}{}", count, direction.as_char()))
        .collect::<Vec<_>>()
        .join(":")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadCoverageSummary {
    pub clip_adjusted_start_position: i32,
    pub clip_adjusted_end_position: i32,
    pub cigar_string: String,
    pub direction_string: String,
}

/// Flags carried over from the alignment record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadFlags {
    pub is_mapped: bool,
    pub is_proper_pair: bool,
    pub is_primary_alignment: bool,
    pub is_pcr_duplicate: bool,
}

impl ReadFlags {
    fn from_record(record: &AlignmentRecord) -> Self {
        ReadFlags {
            is_mapped: record.is_mapped(),
            is_proper_pair: record.is_proper_pair(),
            is_primary_alignment: record.is_primary_alignment(),
            is_pcr_duplicate: record.is_duplicate(),
        }
    }
}

/// One sequencing read.
///
/// `sequence`, `qualities`, `position_map` and `direction_map` always have the
/// same length, which equals the read span of `cigar` whenever a CIGAR is set.
/// `Clone` yields a fully independent copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Read {
    chromosome: String,
    name: String,
    position: i32,
    mate_position: i32,
    map_quality: u8,
    flags: ReadFlags,
    is_duplex: bool,
    sequence: Vec<u8>,
    qualities: Vec<u8>,
    cigar: Cigar,
    stitched_cigar: Option<Cigar>,
    position_map: Vec<i32>,
    direction_map: Vec<DirectionType>,
}

/// The CIGAR must describe exactly `read_length` bases, unless it is empty
fn check_read_span(cigar: &Cigar, read_length: usize) -> Result<(), ReadErr> {
    let read_span = cigar.read_span() as usize;
    if !cigar.is_empty() && read_span != read_length {
        return Err(ReadErr::Operation(format!(
            "CIGAR {} describes {} bases but the read has {}",
            cigar, read_span, read_length
        )));
    }
    Ok(())
}

/// Fill `position_map` with one entry per read base of a span-checked `cigar`
fn fill_position_map(
    position_map: &mut Vec<i32>,
    position: i32,
    cigar: &Cigar,
    read_length: usize,
) {
    position_map.clear();

    if cigar.is_empty() {
        position_map.resize(read_length, UNMAPPED);
        return;
    }

    let mut reference_position = position;
    for op in cigar.ops() {
        let len = op.len() as i32;
        match op.kind() {
            CigarKind::Match => {
                position_map.extend(reference_position..reference_position + len);
                reference_position += len;
            }
            CigarKind::Insertion | CigarKind::SoftClip => {
                position_map.extend(std::iter::repeat(UNMAPPED).take(len as usize));
            }
            CigarKind::Deletion => reference_position += len,
        }
    }
}

/// 1-based position from a 0-based record coordinate
fn one_based(position: i64) -> Option<i32> {
    i32::try_from(position.checked_add(1)?).ok()
}

fn is_duplex(record: &AlignmentRecord) -> bool {
    matches!(
        (
            record.int_tag(FIRST_READ_COUNT_TAG),
            record.int_tag(SECOND_READ_COUNT_TAG)
        ),
        (Some(first), Some(second)) if first != 0 && second != 0
    )
}

fn stitched_cigar_tag(record: &AlignmentRecord) -> Result<Option<Cigar>, ReadErr> {
    record
        .string_tag(STITCHED_CIGAR_TAG)
        .map(|text| text.parse::<Cigar>())
        .transpose()
        .map_err(ReadErr::from)
}

impl Read {
    /// Build a read from a record of the given chromosome
    pub fn new(chromosome: &str, record: &AlignmentRecord) -> Result<Self, ReadErr> {
        let mut read = Read {
            chromosome: String::new(),
            name: String::new(),
            position: 0,
            mate_position: 0,
            map_quality: 0,
            flags: ReadFlags::default(),
            is_duplex: false,
            sequence: Vec::new(),
            qualities: Vec::new(),
            cigar: Cigar::default(),
            stitched_cigar: None,
            position_map: Vec::new(),
            direction_map: Vec::new(),
        };
        read.reset(chromosome, record)?;
        Ok(read)
    }

    /// Reinitialize this read from another record, reusing its buffers.
    ///
    /// The record is fully validated first; on error the read is unchanged.
    pub fn reset(&mut self, chromosome: &str, record: &AlignmentRecord) -> Result<(), ReadErr> {
        if chromosome.is_empty() {
            return Err(ReadErr::Validation("chromosome is empty".to_string()));
        }
        if record.bases.is_empty() {
            return Err(ReadErr::Validation(format!(
                "record {} has no bases",
                record.name
            )));
        }
        if !record.qualities.is_empty() && record.qualities.len() != record.bases.len() {
            return Err(ReadErr::Validation(format!(
                "record {} has {} bases but {} qualities",
                record.name,
                record.bases.len(),
                record.qualities.len()
            )));
        }
        let position = one_based(record.position)
            .filter(|&p| p > 0)
            .ok_or_else(|| {
                ReadErr::Validation(format!(
                    "record {} has invalid position {}",
                    record.name, record.position
                ))
            })?;
        // Unmapped mates are stored at -1 and become 0
        let mate_position = one_based(record.mate_position)
            .filter(|&p| p >= 0)
            .ok_or_else(|| {
                ReadErr::Validation(format!(
                    "record {} has invalid mate position {}",
                    record.name, record.mate_position
                ))
            })?;
        let stitched_cigar = stitched_cigar_tag(record)?;
        check_read_span(&record.cigar, record.bases.len())?;

        fill_position_map(
            &mut self.position_map,
            position,
            &record.cigar,
            record.bases.len(),
        );

        self.chromosome.clear();
        self.chromosome.push_str(chromosome);
        self.name.clear();
        self.name.push_str(&record.name);
        self.position = position;
        self.mate_position = mate_position;
        self.map_quality = record.map_quality;
        self.flags = ReadFlags::from_record(record);
        self.is_duplex = is_duplex(record);

        self.sequence.clear();
        self.sequence.extend_from_slice(&record.bases);
        self.qualities.clear();
        if record.qualities.is_empty() {
            self.qualities.resize(record.bases.len(), 0);
        } else {
            self.qualities.extend_from_slice(&record.qualities);
        }

        self.cigar = record.cigar.clone();
        self.stitched_cigar = stitched_cigar;

        self.direction_map.clear();
        self.direction_map
            .resize(record.bases.len(), DirectionType::Forward);

        Ok(())
    }

    /// Assemble a stitched read from already reconciled parts.
    ///
    /// Identity, mate and flags are taken from `template`; both the primary
    /// and the stitched CIGAR are set to `cigar`.
    pub(crate) fn stitched(
        template: &Read,
        position: i32,
        sequence: Vec<u8>,
        qualities: Vec<u8>,
        direction_map: Vec<DirectionType>,
        cigar: Cigar,
        is_duplex: bool,
    ) -> Result<Self, ReadErr> {
        if sequence.len() != qualities.len() || sequence.len() != direction_map.len() {
            return Err(ReadErr::Validation(format!(
                "stitched read has {} bases, {} qualities and {} directions",
                sequence.len(),
                qualities.len(),
                direction_map.len()
            )));
        }
        check_read_span(&cigar, sequence.len())?;
        let mut position_map = Vec::with_capacity(sequence.len());
        fill_position_map(&mut position_map, position, &cigar, sequence.len());

        Ok(Read {
            chromosome: template.chromosome.clone(),
            name: template.name.clone(),
            position,
            mate_position: template.mate_position,
            map_quality: template.map_quality,
            flags: template.flags,
            is_duplex,
            sequence,
            qualities,
            stitched_cigar: Some(cigar.clone()),
            cigar,
            position_map,
            direction_map,
        })
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based position of the first aligned base
    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn mate_position(&self) -> i32 {
        self.mate_position
    }

    pub fn map_quality(&self) -> u8 {
        self.map_quality
    }

    pub fn is_mapped(&self) -> bool {
        self.flags.is_mapped
    }

    pub fn is_proper_pair(&self) -> bool {
        self.flags.is_proper_pair
    }

    pub fn is_primary_alignment(&self) -> bool {
        self.flags.is_primary_alignment
    }

    pub fn is_pcr_duplicate(&self) -> bool {
        self.flags.is_pcr_duplicate
    }

    pub fn is_duplex(&self) -> bool {
        self.is_duplex
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn qualities(&self) -> &[u8] {
        &self.qualities
    }

    pub fn qualities_mut(&mut self) -> &mut [u8] {
        &mut self.qualities
    }

    pub fn cigar(&self) -> &Cigar {
        &self.cigar
    }

    /// Replace the CIGAR, recomputing the position map.
    ///
    /// On error the read keeps its current CIGAR and position map.
    pub fn set_cigar(&mut self, cigar: Cigar) -> Result<(), ReadErr> {
        let read_length = self.len();
        check_read_span(&cigar, read_length)?;
        fill_position_map(&mut self.position_map, self.position, &cigar, read_length);
        self.cigar = cigar;
        Ok(())
    }

    pub fn stitched_cigar(&self) -> Option<&Cigar> {
        self.stitched_cigar.as_ref()
    }

    pub fn set_stitched_cigar(&mut self, stitched_cigar: Option<Cigar>) {
        self.stitched_cigar = stitched_cigar;
    }

    pub fn position_map(&self) -> &[i32] {
        &self.position_map
    }

    pub fn position_map_mut(&mut self) -> &mut [i32] {
        &mut self.position_map
    }

    pub fn direction_map(&self) -> &[DirectionType] {
        &self.direction_map
    }

    pub fn direction_map_mut(&mut self) -> &mut [DirectionType] {
        &mut self.direction_map
    }

    pub fn set_direction_map(&mut self, direction_map: Vec<DirectionType>) -> Result<(), ReadErr> {
        if direction_map.len() != self.len() {
            return Err(ReadErr::Validation(format!(
                "direction map has {} entries but the read has {} bases",
                direction_map.len(),
                self.len()
            )));
        }
        self.direction_map = direction_map;
        Ok(())
    }

    /// Mark every base as coming from the given direction
    pub fn set_direction(&mut self, direction: DirectionType) {
        self.direction_map.fill(direction);
    }

    /// Position minus the leading soft-clip
    pub fn clip_adjusted_position(&self) -> i32 {
        self.position - self.cigar.prefix_clip() as i32
    }

    pub fn coverage_summary(&self) -> ReadCoverageSummary {
        let end = self.position + self.cigar.reference_span() as i32 - 1;
        ReadCoverageSummary {
            clip_adjusted_start_position: self.clip_adjusted_position(),
            clip_adjusted_end_position: end + self.cigar.suffix_clip() as i32,
            cigar_string: self.cigar.to_string(),
            direction_string: direction_string(&self.direction_map),
        }
    }
}

impl fmt::Display for Read {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{} {}",
            self.name, self.chromosome, self.position, self.cigar
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::alignment_record::AuxValue;

    pub(crate) fn record(bases: &str, position: i64, cigar: &str) -> AlignmentRecord {
        AlignmentRecord {
            name: "read".to_string(),
            position,
            bases: bases.as_bytes().to_vec(),
            cigar: cigar.parse().unwrap(),
            ..Default::default()
        }
    }

    fn read(chromosome: &str, bases: &str, position: i32, cigar: &str) -> Read {
        Read::new(chromosome, &record(bases, (position - 1) as i64, cigar)).unwrap()
    }

    fn counts_record(first: Option<i64>, second: Option<i64>) -> AlignmentRecord {
        let mut rec = record("ACTC", 5, "1S3M");
        if let Some(first) = first {
            rec.set_tag(FIRST_READ_COUNT_TAG, AuxValue::Int(first));
        }
        if let Some(second) = second {
            rec.set_tag(SECOND_READ_COUNT_TAG, AuxValue::Int(second));
        }
        rec
    }

    #[test]
    fn test_constructor() {
        let rec = AlignmentRecord {
            bases: b"ACTCTAAAAA".to_vec(),
            position: 134345,
            ..Default::default()
        };
        let read = Read::new("chr4", &rec).unwrap();

        assert_eq!(read.chromosome(), "chr4");
        assert_eq!(read.sequence(), b"ACTCTAAAAA");
        assert_eq!(read.position(), 134346);
        assert_eq!(read.len(), 10);
        assert_eq!(read.position_map().len(), read.len());
        // No CIGAR: nothing is placed on the reference
        assert!(read.position_map().iter().all(|&p| p == UNMAPPED));

        assert!(matches!(Read::new("", &rec), Err(ReadErr::Validation(_))));
        assert!(matches!(
            Read::new("chr1", &AlignmentRecord::default()),
            Err(ReadErr::Validation(_))
        ));
    }

    #[test]
    fn test_from_record() {
        let mut rec = AlignmentRecord {
            bases: b"ATCTTA".to_vec(),
            position: 100,
            mate_position: 500,
            name: "test".to_string(),
            cigar: "5M1S".parse().unwrap(),
            map_quality: 10,
            qualities: vec![10, 20, 30, 40, 50, 60],
            ..Default::default()
        };
        rec.set_is_duplicate(true);
        rec.set_is_proper_pair(true);
        rec.set_is_secondary_alignment(true);
        rec.set_is_unmapped(true);

        let read = Read::new("chr1", &rec).unwrap();
        assert_eq!(read.chromosome(), "chr1");
        assert_eq!(read.sequence(), rec.bases.as_slice());
        assert_eq!(read.position(), 101);
        assert_eq!(read.mate_position(), 501);
        assert_eq!(read.name(), "test");
        assert_eq!(read.cigar(), &rec.cigar);
        assert_eq!(read.map_quality(), 10);
        assert_eq!(read.is_mapped(), rec.is_mapped());
        assert_eq!(read.is_proper_pair(), rec.is_proper_pair());
        assert_eq!(read.is_primary_alignment(), rec.is_primary_alignment());
        assert_eq!(read.is_pcr_duplicate(), rec.is_duplicate());
        assert!(read
            .direction_map()
            .iter()
            .all(|&d| d == DirectionType::Forward));
        assert_eq!(read.qualities(), rec.qualities.as_slice());
    }

    #[test]
    fn test_quality_length_mismatch() {
        let mut rec = record("ATCTTA", 100, "6M");
        rec.qualities = vec![10, 20, 30];
        assert!(matches!(Read::new("chr1", &rec), Err(ReadErr::Validation(_))));

        // Missing qualities are filled with zeros
        rec.qualities.clear();
        let read = Read::new("chr1", &rec).unwrap();
        assert_eq!(read.qualities(), &[0; 6]);
    }

    #[test]
    fn test_invalid_stitched_cigar_tag() {
        let mut rec = record("ACTC", 5, "1S3M");
        rec.set_tag(STITCHED_CIGAR_TAG, AuxValue::Text("3Q".to_string()));
        assert!(matches!(Read::new("chr1", &rec), Err(ReadErr::Format(_))));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut rec = record("ACTC", 5, "1S3M");
        rec.qualities = vec![20, 21, 30, 40];
        rec.mate_position = 12312;
        rec.set_is_duplicate(true);
        rec.set_is_proper_pair(true);

        let mut read = Read::new("chr1", &rec).unwrap();
        read.set_stitched_cigar(Some("7M".parse().unwrap()));
        read.set_direction_map(vec![
            DirectionType::Forward,
            DirectionType::Reverse,
            DirectionType::Stitched,
            DirectionType::Reverse,
        ])
        .unwrap();

        let mut cloned = read.clone();
        assert_eq!(cloned, read);

        read.position_map_mut()[0] = 1000;
        assert_ne!(cloned.position_map()[0], 1000);
        read.direction_map_mut()[0] = DirectionType::Stitched;
        assert_ne!(cloned.direction_map()[0], DirectionType::Stitched);
        read.qualities_mut()[0] = 11;
        assert_ne!(cloned.qualities()[0], 11);

        let reversed = read.cigar().reversed();
        read.set_cigar(reversed).unwrap();
        assert_ne!(cloned.cigar().to_string(), read.cigar().to_string());

        // And the other way around
        cloned.qualities_mut()[1] = 99;
        assert_eq!(read.qualities()[1], 21);
        cloned.set_stitched_cigar(None);
        assert_eq!(read.stitched_cigar().unwrap().to_string(), "7M");
    }

    #[test]
    fn test_reset() {
        let mut rec = record("ACTC", 5, "1S3M");
        rec.qualities = vec![20, 21, 30, 40];
        rec.mate_position = 12312;
        rec.set_is_duplicate(true);
        rec.set_is_proper_pair(true);

        let mut read = Read::new("chr1", &rec).unwrap();
        read.set_stitched_cigar(Some("7M".parse().unwrap()));
        read.set_direction(DirectionType::Reverse);

        rec.set_is_duplicate(false);
        rec.mate_position = 555;
        read.reset("chr2", &rec).unwrap();
        assert_eq!(read.mate_position(), 556);
        assert!(!read.is_pcr_duplicate());
        assert_eq!(read.chromosome(), "chr2");
        assert!(read.stitched_cigar().is_none());
        assert!(read
            .direction_map()
            .iter()
            .all(|&d| d == DirectionType::Forward));

        rec.set_tag(STITCHED_CIGAR_TAG, AuxValue::Text("1S3M1S".to_string()));
        read.reset("chr3", &rec).unwrap();
        assert_eq!(read.mate_position(), 556);
        assert!(!read.is_pcr_duplicate());
        assert_eq!(read.chromosome(), "chr3");
        assert_eq!(read.stitched_cigar().unwrap().to_string(), "1S3M1S");

        let longer = record("ACTTCCCAAAAT", 99, "2S5M4I10D1M");
        read.reset("chr4", &longer).unwrap();
        assert_eq!(read.len(), 12);
        assert_eq!(read.qualities().len(), 12);
        assert_eq!(read.direction_map().len(), 12);
        assert_eq!(read.position_map()[2], 100);
    }

    #[test]
    fn test_duplex_from_read_counts() {
        let cases = [
            (Some(5), Some(10), true),
            (Some(0), Some(5), false),
            (None, Some(5), false),
            (Some(5), Some(0), false),
            (Some(5), None, false),
            (Some(0), Some(0), false),
            (None, None, false),
        ];
        for (first, second, expected) in cases {
            let read = Read::new("chr1", &counts_record(first, second)).unwrap();
            assert_eq!(read.is_duplex(), expected, "counts {:?}/{:?}", first, second);
        }

        // reset re-derives the flag
        let mut read = Read::new("chr1", &counts_record(Some(5), Some(10))).unwrap();
        read.reset("chr1", &counts_record(Some(5), None)).unwrap();
        assert!(!read.is_duplex());
    }

    #[test]
    fn test_position_map() {
        let r = read("chr4", "ACCGACTAAC", 4, "10M");
        assert_eq!(r.position_map(), &[4, 5, 6, 7, 8, 9, 10, 11, 12, 13]);

        let r = read("chr4", "ACCGACTAAC", 4, "2S1M4I5D2M1S");
        assert_eq!(r.position_map(), &[-1, -1, 4, -1, -1, -1, -1, 10, 11, -1]);

        let r = read("chr1", "ACTTCCCAAAAT", 100, "12M");
        for (i, &p) in r.position_map().iter().enumerate() {
            assert_eq!(p, r.position() + i as i32);
        }

        let r = read("chr1", "ACTTCCCAAAAT", 100, "2S5M4I10D1M");
        assert_eq!(
            r.position_map(),
            &[-1, -1, 100, 101, 102, 103, 104, -1, -1, -1, -1, 115]
        );

        let rec = record("ACTTCCCAAAAT", 99, "100M");
        assert!(matches!(Read::new("chr1", &rec), Err(ReadErr::Operation(_))));
    }

    #[test]
    fn test_failed_set_cigar_keeps_read() {
        let mut r = read("chr1", "ACGTACGTAC", 5, "10M");
        let before = r.clone();

        assert!(matches!(
            r.set_cigar("100M".parse().unwrap()),
            Err(ReadErr::Operation(_))
        ));
        assert_eq!(r.position_map().len(), r.len());
        assert_eq!(r, before);

        r.set_cigar("2S8M".parse().unwrap()).unwrap();
        assert_eq!(r.position_map()[..3], [UNMAPPED, UNMAPPED, 5]);
    }

    #[test]
    fn test_failed_reset_keeps_read() {
        let mut r = read("chr1", "ACTC", 6, "1S3M");
        let before = r.clone();

        // Span mismatch
        assert!(r.reset("chr2", &record("ACTTCCCAAAAT", 99, "100M")).is_err());
        assert_eq!(r, before);

        // Malformed XC tag
        let mut rec = record("ACTTCCCAAAAT", 99, "12M");
        rec.set_tag(STITCHED_CIGAR_TAG, AuxValue::Text("12".to_string()));
        assert!(matches!(r.reset("chr2", &rec), Err(ReadErr::Format(_))));
        assert_eq!(r, before);
    }

    #[test]
    fn test_invalid_positions() {
        // Unmapped records carry position -1
        let rec = record("ACGT", -1, "4M");
        assert!(matches!(Read::new("chr1", &rec), Err(ReadErr::Validation(_))));

        let rec = record("ACGT", i32::MAX as i64, "4M");
        assert!(matches!(Read::new("chr1", &rec), Err(ReadErr::Validation(_))));

        let mut rec = record("ACGT", 0, "4M");
        rec.mate_position = -1;
        assert_eq!(Read::new("chr1", &rec).unwrap().mate_position(), 0);
        rec.mate_position = i64::MAX;
        assert!(matches!(Read::new("chr1", &rec), Err(ReadErr::Validation(_))));
    }

    #[test]
    fn test_coverage_summary() {
        let position = 134345;
        let mut r = read("chr4", "ACTCTAAAAA", position, "10M");

        let summary = r.coverage_summary();
        assert_eq!(summary.clip_adjusted_start_position, position);
        assert_eq!(summary.clip_adjusted_end_position, position + 9);
        assert_eq!(summary.cigar_string, "10M");
        assert_eq!(summary.direction_string, "10F");

        r.set_cigar("2S1I5M2S".parse().unwrap()).unwrap();
        let summary = r.coverage_summary();
        assert_eq!(summary.clip_adjusted_start_position, position - 2);
        assert_eq!(summary.clip_adjusted_end_position, position + 7 - 1);
        assert_eq!(summary.cigar_string, "2S1I5M2S");

        r.set_direction(DirectionType::Reverse);
        assert_eq!(r.coverage_summary().direction_string, "10R");
        r.set_direction(DirectionType::Stitched);
        assert_eq!(r.coverage_summary().direction_string, "10S");

        let mut directions = vec![DirectionType::Reverse; 2];
        directions.extend(vec![DirectionType::Stitched; 4]);
        directions.extend(vec![DirectionType::Forward; 4]);
        r.set_direction_map(directions).unwrap();
        assert_eq!(r.coverage_summary().direction_string, "2R:4S:4F");

        assert!(r.set_direction_map(vec![DirectionType::Forward; 3]).is_err());
    }
}
