use super::{OverlapBoundary, StitcherOptions};
use crate::cigar::Cigar;
use crate::read::{DirectionType, Read, ReadErr};

pub const NO_CALL_BASE: u8 = b'N';

/// Call one overlapping base pair, returning the base and its quality
fn call_base(
    base1: u8,
    quality1: u8,
    base2: u8,
    quality2: u8,
    options: &StitcherOptions,
) -> (u8, u8) {
    if base1 == base2 {
        return (base1, quality1.max(quality2));
    }

    let threshold = options.min_base_call_quality;
    let confident1 = quality1 >= threshold;
    let confident2 = quality2 >= threshold;

    match (confident1, confident2) {
        (true, false) => (base1, quality1),
        (false, true) => (base2, quality2),
        (false, false) => (NO_CALL_BASE, 0),
        (true, true) if options.mask_confident_disagreements => (NO_CALL_BASE, 0),
        (true, true) if quality2 > quality1 => (base2, quality2),
        (true, true) => (base1, quality1),
    }
}

/// Build the stitched read of `read1` and `read2`.
///
/// Bases outside the overlap are copied with their qualities and directions;
/// overlapping bases are called pairwise and marked as stitched.
pub fn generate_consensus(
    read1: &Read,
    read2: &Read,
    stitched_cigar: Cigar,
    position: i32,
    boundary: &OverlapBoundary,
    options: &StitcherOptions,
) -> Result<Read, ReadErr> {
    let overlap = boundary.overlap_length;
    let r1_start = boundary.read1.start_index;
    let r2_end = boundary.read2.end_index + 1;
    if r1_start + overlap != read1.len() || r2_end != overlap || overlap > read2.len() {
        return Err(ReadErr::Operation(format!(
            "overlap of {} bases does not fit reads of {} and {} bases",
            overlap,
            read1.len(),
            read2.len()
        )));
    }

    let length = read1.len() + read2.len() - overlap;
    let mut sequence = Vec::with_capacity(length);
    let mut qualities = Vec::with_capacity(length);
    let mut direction_map = Vec::with_capacity(length);

    sequence.extend_from_slice(&read1.sequence()[..r1_start]);
    qualities.extend_from_slice(&read1.qualities()[..r1_start]);
    direction_map.extend_from_slice(&read1.direction_map()[..r1_start]);

    let overlap1 = read1.sequence()[r1_start..]
        .iter()
        .zip(&read1.qualities()[r1_start..]);
    let overlap2 = read2.sequence()[..r2_end]
        .iter()
        .zip(&read2.qualities()[..r2_end]);
    for ((&base1, &quality1), (&base2, &quality2)) in overlap1.zip(overlap2) {
        let (base, quality) = call_base(base1, quality1, base2, quality2, options);
        sequence.push(base);
        qualities.push(quality);
        direction_map.push(DirectionType::Stitched);
    }

    sequence.extend_from_slice(&read2.sequence()[r2_end..]);
    qualities.extend_from_slice(&read2.qualities()[r2_end..]);
    direction_map.extend_from_slice(&read2.direction_map()[r2_end..]);

    Read::stitched(
        read1,
        position,
        sequence,
        qualities,
        direction_map,
        stitched_cigar,
        read1.is_duplex() || read2.is_duplex(),
    )
}
