use super::StitchErr;
use crate::cigar::Cigar;
use crate::read::Read;

/// Inclusive index range into a read's sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadIndexBoundary {
    pub start_index: usize,
    pub end_index: usize,
}

/// Overlapping bases of two ordered reads under a stitched CIGAR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapBoundary {
    pub overlap_length: usize,
    pub read1: ReadIndexBoundary,
    pub read2: ReadIndexBoundary,
}

/// Locate the overlap of `read1` and `read2` given their stitched CIGAR.
///
/// Whatever the stitched CIGAR contains, the overlap is the last
/// `overlap_length` bases of read1 and the first `overlap_length` bases of
/// read2.
pub fn get_overlap_boundary(
    read1: &Read,
    read2: &Read,
    stitched_cigar: &Cigar,
) -> Result<OverlapBoundary, StitchErr> {
    let total_stitched_length = stitched_cigar.read_span() as i64;
    let overlap_length = read1.len() as i64 + read2.len() as i64 - total_stitched_length;

    if overlap_length <= 0 {
        return Err(StitchErr::NotStitchable(format!(
            "No overlap between reads {} and {} under {}",
            read1, read2, stitched_cigar
        )));
    }
    let overlap_length = overlap_length as usize;
    if overlap_length > read1.len() || overlap_length > read2.len() {
        return Err(StitchErr::NotStitchable(format!(
            "Overlap of {} bases under {} is longer than reads {} and {}",
            overlap_length, stitched_cigar, read1, read2
        )));
    }

    Ok(OverlapBoundary {
        overlap_length,
        read1: ReadIndexBoundary {
            start_index: read1.len() - overlap_length,
            end_index: read1.len() - 1,
        },
        read2: ReadIndexBoundary {
            start_index: 0,
            end_index: overlap_length - 1,
        },
    })
}
