use super::{partners, stitch_with_cigar, StitchErr, StitchOutcome, Stitcher, StitcherOptions};
use crate::alignment_set::AlignmentSet;
use crate::cigar::Cigar;

/// Stitcher that only trusts the merged CIGAR carried in both reads' XC tags
pub struct XcStitcher {
    options: StitcherOptions,
}

impl XcStitcher {
    pub fn new(options: StitcherOptions) -> Self {
        XcStitcher { options }
    }

    fn get_stitched_cigar(set: &AlignmentSet) -> Result<Cigar, StitchErr> {
        let (read1, read2) = partners(set)?;
        match (read1.stitched_cigar(), read2.stitched_cigar()) {
            (Some(cigar1), Some(cigar2)) if cigar1.to_string() == cigar2.to_string() => {
                Ok(cigar1.clone())
            }
            (Some(cigar1), Some(cigar2)) => Err(StitchErr::NotStitchable(format!(
                "XC tags {} and {} of reads {} and {} differ",
                cigar1, cigar2, read1, read2
            ))),
            _ => Err(StitchErr::NotStitchable(format!(
                "XC tag is not available for reads {} and {}",
                read1, read2
            ))),
        }
    }
}

impl Stitcher for XcStitcher {
    fn try_stitch(&self, set: &mut AlignmentSet) -> Result<StitchOutcome, StitchErr> {
        let stitched_cigar = Self::get_stitched_cigar(set)?;
        // The merged read starts with read1's first base, clips included
        let position =
            set.partner_read1().clip_adjusted_position() + stitched_cigar.prefix_clip() as i32;
        stitch_with_cigar(set, stitched_cigar, position, &self.options)
    }
}
