//! Paired-end read stitching
//!
//! A stitcher turns the two overlapping reads of an [`AlignmentSet`] into a
//! single consensus read. Two strategies exist: [`BasicStitcher`] recomputes
//! the merged CIGAR from both reads' alignments, [`XcStitcher`] trusts the
//! merged CIGAR supplied upstream in the XC tag.

pub mod basic;
pub mod consensus;
pub mod overlap;
pub mod xc;

use crate::alignment_set::AlignmentSet;
use crate::cigar::Cigar;
use crate::read::Read;
use log::{debug, warn};
use std::fmt;

pub use basic::BasicStitcher;
pub use consensus::generate_consensus;
pub use overlap::{get_overlap_boundary, OverlapBoundary, ReadIndexBoundary};
pub use xc::XcStitcher;

#[derive(Debug)]
pub enum StitchErr {
    /// The set cannot be stitched at all (missing partner, different chromosomes)
    Validation(String),
    /// The overlap geometry is impossible or the XC tag is absent/mismatched
    NotStitchable(String),
}

impl fmt::Display for StitchErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StitchErr::Validation(msg) => write!(f, "Invalid alignment set: {}", msg),
            StitchErr::NotStitchable(msg) => write!(f, "Reads not stitchable: {}", msg),
        }
    }
}

impl std::error::Error for StitchErr {}

/// Why a stitch attempt was abandoned without an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Read2 has no base aligned to the reference
    NoAlignedBases,
    /// The first aligned base of read2 is not aligned in read1
    NoAlignedOverlap,
    /// Read2 has more leading bases than read1 before the shared anchor
    Read2ExtendsBeyondRead1,
    /// Read2 ends before read1 does
    Read2ContainedInRead1,
    /// The reads disagree on how the overlap aligns to the reference
    AlignmentDisagreement(usize),
    /// Merging produced soft-clips or deletions in impossible places
    InvalidMergedAlignment(String),
    /// The merged CIGAR does not reproduce the reads' reference positions
    InconsistentPositions(i32),
    /// Building the consensus read failed
    Consensus(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoAlignedBases => write!(f, "read2 has no aligned bases"),
            SkipReason::NoAlignedOverlap => {
                write!(f, "reads do not overlap in their aligned bases")
            }
            SkipReason::Read2ExtendsBeyondRead1 => {
                write!(f, "read2 extends beyond the start of read1")
            }
            SkipReason::Read2ContainedInRead1 => write!(f, "read2 ends before read1"),
            SkipReason::AlignmentDisagreement(index) => write!(
                f,
                "reads disagree on the alignment at overlap index {}",
                index
            ),
            SkipReason::InvalidMergedAlignment(cigar) => {
                write!(f, "merged alignment {} is not valid", cigar)
            }
            SkipReason::InconsistentPositions(position) => write!(
                f,
                "merged alignment is inconsistent with the reads at position {}",
                position
            ),
            SkipReason::Consensus(msg) => write!(f, "consensus failed: {}", msg),
        }
    }
}

/// Result of a stitch attempt that did not raise a [`StitchErr`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StitchOutcome {
    /// The stitched read is the single entry of `reads_for_processing`
    Stitched,
    /// Nothing was added to `reads_for_processing`
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StitcherOptions {
    /// Quality a base must reach to win a disagreement in the overlap
    pub min_base_call_quality: u8,
    /// Only stitch reads carrying matching XC tags
    pub require_xc_tag: bool,
    /// Emit N when disagreeing bases both reach `min_base_call_quality`
    pub mask_confident_disagreements: bool,
}

impl Default for StitcherOptions {
    fn default() -> Self {
        Self {
            min_base_call_quality: 20,
            require_xc_tag: false,
            mask_confident_disagreements: true,
        }
    }
}

pub trait Stitcher: Send + Sync {
    /// Try to stitch the reads of `set`.
    ///
    /// On `Ok(Stitched)` the set holds exactly one stitched read. On
    /// `Ok(Skipped(_))` and on `Err(_)` the output list is left untouched and
    /// the caller decides how to fall back.
    fn try_stitch(&self, set: &mut AlignmentSet) -> Result<StitchOutcome, StitchErr>;
}

/// Build the stitcher selected by `options`
pub fn get_stitcher(options: StitcherOptions) -> Box<dyn Stitcher> {
    if options.require_xc_tag {
        Box::new(XcStitcher::new(options))
    } else {
        Box::new(BasicStitcher::new(options))
    }
}

fn partners(set: &AlignmentSet) -> Result<(&Read, &Read), StitchErr> {
    let read1 = set.partner_read1();
    let read2 = set
        .partner_read2()
        .ok_or_else(|| StitchErr::Validation(format!("set of {} has a missing read", read1)))?;

    if read1.chromosome() != read2.chromosome() {
        return Err(StitchErr::Validation(format!(
            "partner reads {} and {} are from different chromosomes",
            read1, read2
        )));
    }
    Ok((read1, read2))
}

/// Shared tail of every strategy: resolve the overlap for `stitched_cigar`,
/// build the consensus and store it in the set.
pub(crate) fn stitch_with_cigar(
    set: &mut AlignmentSet,
    stitched_cigar: Cigar,
    position: i32,
    options: &StitcherOptions,
) -> Result<StitchOutcome, StitchErr> {
    let (read1, read2) = partners(set)?;

    let boundary = get_overlap_boundary(read1, read2, &stitched_cigar)?;

    match generate_consensus(read1, read2, stitched_cigar, position, &boundary, options) {
        Ok(merged) => {
            debug!(
                "Stitched {} and {} into {} (overlap {})",
                read1,
                read2,
                merged.cigar(),
                boundary.overlap_length
            );
            set.reads_for_processing.push(merged);
            set.is_stitched = true;
            Ok(StitchOutcome::Stitched)
        }
        Err(e) => Ok(skip(read1, read2, SkipReason::Consensus(e.to_string()))),
    }
}

pub(crate) fn skip(read1: &Read, read2: &Read, reason: SkipReason) -> StitchOutcome {
    warn!("Error stitching reads {} and {}: {}", read1, read2, reason);
    StitchOutcome::Skipped(reason)
}

/// Stitch `set`, falling back to the unmerged reads when stitching is skipped
/// or the reads are not stitchable. A `NotStitchable` error is still returned
/// after the fallback is in place; validation errors leave the set untouched.
pub fn stitch_or_fallback(
    stitcher: &dyn Stitcher,
    set: &mut AlignmentSet,
) -> Result<StitchOutcome, StitchErr> {
    let outcome = match stitcher.try_stitch(set) {
        Ok(outcome) => outcome,
        Err(StitchErr::NotStitchable(msg)) => {
            debug!("{}", msg);
            set.use_unstitched_reads();
            return Err(StitchErr::NotStitchable(msg));
        }
        Err(e) => return Err(e),
    };

    if let StitchOutcome::Skipped(_) = outcome {
        set.use_unstitched_reads();
    }
    Ok(outcome)
}
