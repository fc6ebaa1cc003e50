//! Stitching by recomputing the merged CIGAR from both reads' alignments.
//!
//! Each read is expanded into one column per base. Read2's first aligned base
//! anchors it onto read1; from there read1's columns up to the overlap, the
//! reconciled overlap columns and read2's remaining columns are encoded back
//! into a single CIGAR.

use super::{
    partners, skip, stitch_with_cigar, SkipReason, StitchErr, StitchOutcome, Stitcher,
    StitcherOptions,
};
use crate::alignment_set::AlignmentSet;
use crate::cigar::{Cigar, CigarKind, CigarOp, CigarParseErr};
use crate::read::{Read, UNMAPPED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Column {
    /// Match, Insertion or SoftClip
    kind: CigarKind,
    reference_position: i32,
    /// Length of the deletion immediately before this base
    deletion_before: u32,
}

impl Column {
    fn is_clipped(&self) -> bool {
        self.kind == CigarKind::SoftClip
    }
}

fn columns(read: &Read) -> Vec<Column> {
    let mut columns = Vec::with_capacity(read.len());
    let mut pending_deletion = 0;
    let position_map = read.position_map();

    for op in read.cigar().ops() {
        if op.kind() == CigarKind::Deletion {
            pending_deletion += op.len();
            continue;
        }
        for _ in 0..op.len() {
            let index = columns.len();
            columns.push(Column {
                kind: op.kind(),
                reference_position: position_map[index],
                deletion_before: pending_deletion,
            });
            pending_deletion = 0;
        }
    }
    columns
}

/// Reconcile the two reads' view of one overlapping base
fn reconcile(c1: &Column, c2: &Column, overlap_index: usize) -> Result<Column, SkipReason> {
    let mut column = match (c1.kind, c2.kind) {
        (CigarKind::SoftClip, _) => *c2,
        (_, CigarKind::SoftClip) => *c1,
        (CigarKind::Match, CigarKind::Match)
            if c1.reference_position == c2.reference_position =>
        {
            *c1
        }
        (CigarKind::Insertion, CigarKind::Insertion) => *c1,
        _ => return Err(SkipReason::AlignmentDisagreement(overlap_index)),
    };

    // Read2's leading deletions have nothing to attach to
    if overlap_index > 0 {
        column.deletion_before = if c1.is_clipped() || c2.is_clipped() {
            c1.deletion_before.max(c2.deletion_before)
        } else if c1.deletion_before == c2.deletion_before {
            c1.deletion_before
        } else {
            return Err(SkipReason::AlignmentDisagreement(overlap_index));
        };
    } else {
        column.deletion_before = c1.deletion_before;
    }
    Ok(column)
}

fn encode(columns: &[Column]) -> Result<Cigar, CigarParseErr> {
    let mut ops = Vec::with_capacity(columns.len());
    for column in columns {
        if column.deletion_before > 0 {
            ops.push(CigarOp::try_new(column.deletion_before, CigarKind::Deletion)?);
        }
        ops.push(CigarOp::new(1, column.kind));
    }
    Cigar::collapsed(ops)
}

/// Index of the read1 base at `reference_position`.
///
/// Bases of the leading soft-clip count as if aligned from the clip-adjusted
/// start, so a mate anchoring inside that clip still finds its overlap.
fn locate(read1: &Read, reference_position: i32) -> Option<usize> {
    if let Some(index) = read1
        .position_map()
        .iter()
        .position(|&p| p == reference_position)
    {
        return Some(index);
    }
    let offset = reference_position - read1.clip_adjusted_position();
    if offset >= 0 && (offset as u32) < read1.cigar().prefix_clip() {
        Some(offset as usize)
    } else {
        None
    }
}

/// Soft-clips only at the ends, deletions only between aligned bases
fn validate(columns: &[Column]) -> bool {
    let first_aligned = columns.iter().position(|c| !c.is_clipped());
    let last_aligned = columns.iter().rposition(|c| !c.is_clipped());
    let (first, last) = match (first_aligned, last_aligned) {
        (Some(first), Some(last)) => (first, last),
        _ => return false,
    };

    columns[first..=last].iter().all(|c| !c.is_clipped())
        && columns
            .iter()
            .enumerate()
            .all(|(i, c)| c.deletion_before == 0 || (i > first && i <= last))
}

/// Check every aligned column against a walk of the merged CIGAR
fn verify_positions(columns: &[Column], position: i32) -> Result<(), SkipReason> {
    let mut reference_position = position;
    for column in columns {
        reference_position += column.deletion_before as i32;
        if column.kind == CigarKind::Match {
            if column.reference_position != reference_position {
                return Err(SkipReason::InconsistentPositions(column.reference_position));
            }
            reference_position += 1;
        }
    }
    Ok(())
}

/// Merge the alignments of two ordered reads into one CIGAR and position
pub fn get_stitched_cigar(read1: &Read, read2: &Read) -> Result<(Cigar, i32), SkipReason> {
    let columns1 = columns(read1);
    let columns2 = columns(read2);

    let anchor2 = columns2
        .iter()
        .position(|c| c.kind == CigarKind::Match)
        .ok_or(SkipReason::NoAlignedBases)?;
    let anchor_position = columns2[anchor2].reference_position;
    let anchor1 = locate(read1, anchor_position).ok_or(SkipReason::NoAlignedOverlap)?;

    if anchor1 < anchor2 {
        return Err(SkipReason::Read2ExtendsBeyondRead1);
    }
    let overlap_start = anchor1 - anchor2;
    let overlap_length = columns1.len() - overlap_start;
    if overlap_length > columns2.len() {
        return Err(SkipReason::Read2ContainedInRead1);
    }

    let mut merged = Vec::with_capacity(columns1.len() + columns2.len() - overlap_length);
    merged.extend_from_slice(&columns1[..overlap_start]);
    for (i, (c1, c2)) in columns1[overlap_start..]
        .iter()
        .zip(&columns2[..overlap_length])
        .enumerate()
    {
        merged.push(reconcile(c1, c2, i)?);
    }
    merged.extend_from_slice(&columns2[overlap_length..]);

    let cigar =
        encode(&merged).map_err(|e| SkipReason::InvalidMergedAlignment(e.to_string()))?;
    if !validate(&merged) {
        return Err(SkipReason::InvalidMergedAlignment(cigar.to_string()));
    }

    let position = merged
        .iter()
        .find(|c| c.kind == CigarKind::Match && c.reference_position != UNMAPPED)
        .map(|c| c.reference_position)
        .ok_or(SkipReason::NoAlignedBases)?;
    verify_positions(&merged, position)?;

    Ok((cigar, position))
}

/// Stitcher deriving the merged CIGAR from the reads' own alignments
pub struct BasicStitcher {
    options: StitcherOptions,
}

impl BasicStitcher {
    pub fn new(options: StitcherOptions) -> Self {
        BasicStitcher { options }
    }
}

impl Stitcher for BasicStitcher {
    fn try_stitch(&self, set: &mut AlignmentSet) -> Result<StitchOutcome, StitchErr> {
        let (read1, read2) = partners(set)?;

        let (stitched_cigar, position) = match get_stitched_cigar(read1, read2) {
            Ok(result) => result,
            Err(reason) => return Ok(skip(read1, read2, reason)),
        };

        stitch_with_cigar(set, stitched_cigar, position, &self.options)
    }
}
