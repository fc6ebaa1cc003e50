use crate::alignment_record::{AlignmentRecord, DIRECTION_TAG, STITCHED_CIGAR_TAG};
use crate::alignment_set::AlignmentSet;
use crate::cigar::{Cigar, CigarKind};
use crate::read::{direction_string, DirectionType, Read};
use crate::stitcher::{get_stitcher, StitchErr, StitchOutcome, Stitcher, StitcherOptions};
use log::{debug, info, warn};
use rayon::prelude::*;
use rust_htslib::bam::{
    self,
    header::HeaderRecord,
    record::{Aux, Cigar as HtsCigar, CigarString},
    Read as _,
};
use rustc_hash::FxHashMap;
use std::io;

/// Counters reported at the end of a stitching run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StitchStats {
    pub pairs: usize,
    pub stitched: usize,
    pub skipped: usize,
    pub not_stitchable: usize,
    pub invalid: usize,
    pub passed_through: usize,
}

impl StitchStats {
    fn record(&mut self, outcome: PairOutcome) {
        self.pairs += 1;
        match outcome {
            PairOutcome::Stitched => self.stitched += 1,
            PairOutcome::Skipped => self.skipped += 1,
            PairOutcome::NotStitchable => self.not_stitchable += 1,
            PairOutcome::Invalid => self.invalid += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairOutcome {
    Stitched,
    Skipped,
    NotStitchable,
    Invalid,
}

fn htslib_error(context: &str, e: rust_htslib::errors::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, e))
}

fn to_hts_cigar(cigar: &Cigar) -> CigarString {
    CigarString(
        cigar
            .ops()
            .iter()
            .map(|op| match op.kind() {
                CigarKind::Match => HtsCigar::Match(op.len()),
                CigarKind::Insertion => HtsCigar::Ins(op.len()),
                CigarKind::Deletion => HtsCigar::Del(op.len()),
                CigarKind::SoftClip => HtsCigar::SoftClip(op.len()),
            })
            .collect(),
    )
}

/// Only mapped primary mates aligned to the same contig are stitching candidates
fn is_candidate(record: &bam::Record) -> bool {
    record.is_paired()
        && !record.is_unmapped()
        && !record.is_mate_unmapped()
        && !record.is_secondary()
        && !record.is_supplementary()
        && record.tid() >= 0
        && record.tid() == record.mtid()
}

fn to_read(chromosome: &str, record: &bam::Record) -> Result<Read, String> {
    let alignment = AlignmentRecord::try_from(record)?;
    let mut read = Read::new(chromosome, &alignment).map_err(|e| e.to_string())?;
    read.set_direction(if record.is_reverse() {
        DirectionType::Reverse
    } else {
        DirectionType::Forward
    });
    Ok(read)
}

/// Build the output record of a stitched read
fn stitched_record(read: &Read, tid: i32) -> Result<bam::Record, rust_htslib::errors::Error> {
    let mut record = bam::Record::new();
    record.set(
        read.name().as_bytes(),
        Some(&to_hts_cigar(read.cigar())),
        read.sequence(),
        read.qualities(),
    );
    record.set_tid(tid);
    record.set_pos((read.position() - 1) as i64);
    record.set_mapq(read.map_quality());
    record.set_mtid(-1);
    record.set_mpos(-1);
    if read.is_pcr_duplicate() {
        record.set_duplicate();
    }
    let cigar = read.cigar().to_string();
    record.push_aux(&STITCHED_CIGAR_TAG, Aux::String(&cigar))?;
    let directions = direction_string(read.direction_map());
    record.push_aux(&DIRECTION_TAG, Aux::String(&directions))?;
    Ok(record)
}

fn process_pair(
    stitcher: &dyn Stitcher,
    chromosomes: &[String],
    first: bam::Record,
    second: bam::Record,
) -> (Vec<bam::Record>, PairOutcome) {
    let name = String::from_utf8_lossy(first.qname()).into_owned();
    let chromosome = &chromosomes[first.tid() as usize];

    let reads = to_read(chromosome, &first).and_then(|r1| Ok((r1, to_read(chromosome, &second)?)));
    let (read1, read2) = match reads {
        Ok(reads) => reads,
        Err(e) => {
            warn!("Skipping stitching of {}: {}", name, e);
            return (vec![first, second], PairOutcome::Invalid);
        }
    };

    let mut set = AlignmentSet::new(read1, Some(read2), false);
    match stitcher.try_stitch(&mut set) {
        Ok(StitchOutcome::Stitched) => {
            match stitched_record(&set.reads_for_processing[0], first.tid()) {
                Ok(record) => (vec![record], PairOutcome::Stitched),
                Err(e) => {
                    warn!("Failed to build stitched record for {}: {}", name, e);
                    (vec![first, second], PairOutcome::Skipped)
                }
            }
        }
        Ok(StitchOutcome::Skipped(_)) => (vec![first, second], PairOutcome::Skipped),
        Err(StitchErr::NotStitchable(msg)) => {
            debug!("{}", msg);
            (vec![first, second], PairOutcome::NotStitchable)
        }
        Err(e) => {
            warn!("{}", e);
            (vec![first, second], PairOutcome::Invalid)
        }
    }
}

fn flush_batch(
    batch: &mut Vec<(bam::Record, bam::Record)>,
    stitcher: &dyn Stitcher,
    chromosomes: &[String],
    writer: &mut bam::Writer,
    stats: &mut StitchStats,
) -> io::Result<()> {
    let pairs = std::mem::take(batch);
    let results: Vec<(Vec<bam::Record>, PairOutcome)> = pairs
        .into_par_iter()
        .map(|(first, second)| process_pair(stitcher, chromosomes, first, second))
        .collect();

    for (records, outcome) in results {
        stats.record(outcome);
        for record in &records {
            writer
                .write(record)
                .map_err(|e| htslib_error("Failed to write record", e))?;
        }
    }
    Ok(())
}

/// `@HD` line of the output: records leave in mate-completion order, so any
/// sort order claimed by the input no longer holds.
fn unsorted_hd_line(input_hd: Option<&str>) -> String {
    let mut fields: Vec<&str> = match input_hd {
        Some(line) => line
            .split('\t')
            .skip(1)
            .filter(|field| !field.starts_with("SO:") && !field.starts_with("GO:"))
            .collect(),
        None => Vec::new(),
    };
    if !fields.iter().any(|field| field.starts_with("VN:")) {
        fields.insert(0, "VN:1.6");
    }
    fields.push("SO:unsorted");
    format!("HD\t{}", fields.join("\t"))
}

fn output_header(template: &bam::HeaderView) -> bam::Header {
    let text = String::from_utf8_lossy(template.as_bytes()).into_owned();
    let lines: Vec<&str> = text.lines().filter(|line| !line.is_empty()).collect();
    let input_hd = lines.iter().copied().find(|line| line.starts_with("@HD"));

    let mut header = bam::Header::new();
    header.push_record(&HeaderRecord::new(unsorted_hd_line(input_hd).as_bytes()));
    for line in lines.iter().copied().filter(|line| !line.starts_with("@HD")) {
        header.push_record(&HeaderRecord::new(
            line.strip_prefix('@').unwrap_or(line).as_bytes(),
        ));
    }

    let command_line = std::env::args().collect::<Vec<String>>().join(" ");
    let mut record = HeaderRecord::new(b"PG");
    record.push_tag(b"ID", env!("CARGO_PKG_NAME"));
    record.push_tag(b"PN", env!("CARGO_PKG_NAME"));
    record.push_tag(b"VN", env!("CARGO_PKG_VERSION"));
    record.push_tag(b"CL", command_line);
    header.push_record(&record);
    header
}

/// Stitch the overlapping mates of `input_bam` into `output_bam`.
///
/// Stitched pairs are written as one record carrying XC (merged CIGAR) and XD
/// (direction string) tags; every other record is written unchanged. Output
/// order follows the order in which mates are completed, not coordinates.
pub fn run_stitch(
    input_bam: &str,
    output_bam: &str,
    options: StitcherOptions,
    batch_size: usize,
) -> io::Result<StitchStats> {
    let mut reader = bam::Reader::from_path(input_bam)
        .map_err(|e| htslib_error(&format!("Failed to open '{}'", input_bam), e))?;
    let header_view = reader.header().clone();
    let chromosomes: Vec<String> = header_view
        .target_names()
        .iter()
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect();

    let header = output_header(&header_view);
    let mut writer = bam::Writer::from_path(output_bam, &header, bam::Format::Bam)
        .map_err(|e| htslib_error(&format!("Failed to create '{}'", output_bam), e))?;

    let stitcher = get_stitcher(options);
    let batch_size = batch_size.max(1);
    let mut stats = StitchStats::default();
    let mut pending: FxHashMap<Vec<u8>, bam::Record> = FxHashMap::default();
    let mut batch = Vec::with_capacity(batch_size);

    for result in reader.records() {
        let record = result.map_err(|e| htslib_error("Failed to read record", e))?;

        if !is_candidate(&record) {
            writer
                .write(&record)
                .map_err(|e| htslib_error("Failed to write record", e))?;
            stats.passed_through += 1;
            continue;
        }

        match pending.remove(record.qname()) {
            Some(mate) => {
                batch.push((mate, record));
                if batch.len() >= batch_size {
                    flush_batch(
                        &mut batch,
                        stitcher.as_ref(),
                        &chromosomes,
                        &mut writer,
                        &mut stats,
                    )?;
                    debug!("Processed {} pairs", stats.pairs);
                }
            }
            None => {
                pending.insert(record.qname().to_vec(), record);
            }
        }
    }
    flush_batch(
        &mut batch,
        stitcher.as_ref(),
        &chromosomes,
        &mut writer,
        &mut stats,
    )?;

    // Mates that never showed up
    let mut orphans: Vec<bam::Record> = pending.into_values().collect();
    orphans.sort_by_key(|r| (r.tid(), r.pos()));
    if !orphans.is_empty() {
        warn!("{} reads have no mate in the input", orphans.len());
    }
    for record in &orphans {
        writer
            .write(record)
            .map_err(|e| htslib_error("Failed to write record", e))?;
    }
    stats.passed_through += orphans.len();

    info!(
        "Processed {} pairs: {} stitched, {} skipped, {} not stitchable, {} invalid; {} reads passed through",
        stats.pairs,
        stats.stitched,
        stats.skipped,
        stats.not_stitchable,
        stats.invalid,
        stats.passed_through
    );

    Ok(stats)
}
