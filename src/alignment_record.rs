use crate::cigar::{Cigar, CigarKind, CigarOp};
use rust_htslib::bam::{self, record::Aux, record::Cigar as HtsCigar};
use rustc_hash::FxHashMap;

/// Auxiliary tag holding a merged (stitched) CIGAR computed upstream
pub const STITCHED_CIGAR_TAG: [u8; 2] = *b"XC";
/// Auxiliary tag holding the per-base direction string of a stitched read
pub const DIRECTION_TAG: [u8; 2] = *b"XD";
/// Collapsed read counts from the first and second strand of a duplex family
pub const FIRST_READ_COUNT_TAG: [u8; 2] = *b"XV";
pub const SECOND_READ_COUNT_TAG: [u8; 2] = *b"XW";

/// Value of an auxiliary tag
#[derive(Debug, Clone, PartialEq)]
pub enum AuxValue {
    Int(i64),
    Text(String),
}

/// An alignment record as delivered by the record source.
///
/// Coordinates are 0-based like in BAM. A missing CIGAR is represented by an
/// empty [`Cigar`], missing qualities by an empty vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentRecord {
    pub name: String,
    pub position: i64,
    pub mate_position: i64,
    pub map_quality: u8,
    pub bases: Vec<u8>,
    pub qualities: Vec<u8>,
    pub cigar: Cigar,
    pub flags: u16,
    pub tags: FxHashMap<[u8; 2], AuxValue>,
}

impl AlignmentRecord {
    pub const PAIRED: u16 = 0x1;
    pub const PROPER_PAIR: u16 = 0x2;
    pub const UNMAPPED: u16 = 0x4;
    pub const REVERSE: u16 = 0x10;
    pub const SECONDARY: u16 = 0x100;
    pub const DUPLICATE: u16 = 0x400;
    pub const SUPPLEMENTARY: u16 = 0x800;

    fn set_flag(&mut self, bit: u16, value: bool) {
        if value {
            self.flags |= bit;
        } else {
            self.flags &= !bit;
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.flags & Self::UNMAPPED == 0
    }

    pub fn set_is_unmapped(&mut self, value: bool) {
        self.set_flag(Self::UNMAPPED, value);
    }

    pub fn is_proper_pair(&self) -> bool {
        self.flags & Self::PROPER_PAIR != 0
    }

    pub fn set_is_proper_pair(&mut self, value: bool) {
        self.set_flag(Self::PROPER_PAIR, value);
    }

    pub fn is_primary_alignment(&self) -> bool {
        self.flags & (Self::SECONDARY | Self::SUPPLEMENTARY) == 0
    }

    pub fn set_is_secondary_alignment(&mut self, value: bool) {
        self.set_flag(Self::SECONDARY, value);
    }

    pub fn is_duplicate(&self) -> bool {
        self.flags & Self::DUPLICATE != 0
    }

    pub fn set_is_duplicate(&mut self, value: bool) {
        self.set_flag(Self::DUPLICATE, value);
    }

    pub fn is_reverse(&self) -> bool {
        self.flags & Self::REVERSE != 0
    }

    pub fn set_is_reverse(&mut self, value: bool) {
        self.set_flag(Self::REVERSE, value);
    }

    pub fn int_tag(&self, tag: [u8; 2]) -> Option<i64> {
        match self.tags.get(&tag) {
            Some(AuxValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn string_tag(&self, tag: [u8; 2]) -> Option<&str> {
        match self.tags.get(&tag) {
            Some(AuxValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn set_tag(&mut self, tag: [u8; 2], value: AuxValue) {
        self.tags.insert(tag, value);
    }

    pub fn remove_tag(&mut self, tag: [u8; 2]) {
        self.tags.remove(&tag);
    }
}

fn convert_cigar(record: &bam::Record) -> Result<Cigar, String> {
    let mut ops = Vec::new();
    for op in record.cigar().iter() {
        let (len, kind) = match *op {
            HtsCigar::Match(len) | HtsCigar::Equal(len) | HtsCigar::Diff(len) => {
                (len, CigarKind::Match)
            }
            HtsCigar::Ins(len) => (len, CigarKind::Insertion),
            HtsCigar::Del(len) => (len, CigarKind::Deletion),
            HtsCigar::SoftClip(len) => (len, CigarKind::SoftClip),
            // Hard-clipped bases are not part of the record
            HtsCigar::HardClip(_) => continue,
            HtsCigar::RefSkip(_) | HtsCigar::Pad(_) => {
                return Err(format!("Unsupported CIGAR operation '{}'", op.char()))
            }
        };
        ops.push(CigarOp::try_new(len, kind).map_err(|e| e.to_string())?);
    }
    Cigar::collapsed(ops).map_err(|e| e.to_string())
}

fn convert_aux(value: Aux<'_>) -> Option<AuxValue> {
    match value {
        Aux::I8(v) => Some(AuxValue::Int(v as i64)),
        Aux::U8(v) => Some(AuxValue::Int(v as i64)),
        Aux::I16(v) => Some(AuxValue::Int(v as i64)),
        Aux::U16(v) => Some(AuxValue::Int(v as i64)),
        Aux::I32(v) => Some(AuxValue::Int(v as i64)),
        Aux::U32(v) => Some(AuxValue::Int(v as i64)),
        Aux::String(v) => Some(AuxValue::Text(v.to_string())),
        _ => None,
    }
}

impl TryFrom<&bam::Record> for AlignmentRecord {
    type Error = String;

    fn try_from(record: &bam::Record) -> Result<Self, Self::Error> {
        let name = String::from_utf8_lossy(record.qname()).into_owned();
        let cigar = convert_cigar(record).map_err(|e| format!("Read {}: {}", name, e))?;

        // 0xff marks absent base qualities
        let qual = record.qual();
        let qualities = if qual.first() == Some(&0xff) {
            Vec::new()
        } else {
            qual.to_vec()
        };

        let mut tags = FxHashMap::default();
        for tag in [STITCHED_CIGAR_TAG, FIRST_READ_COUNT_TAG, SECOND_READ_COUNT_TAG] {
            if let Some(value) = record.aux(&tag).ok().and_then(convert_aux) {
                tags.insert(tag, value);
            }
        }

        Ok(AlignmentRecord {
            name,
            position: record.pos(),
            mate_position: record.mpos(),
            map_quality: record.mapq(),
            bases: record.seq().as_bytes(),
            qualities,
            cigar,
            flags: record.flags(),
            tags,
        })
    }
}
