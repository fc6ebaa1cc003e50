use crate::read::Read;

/// The reads of one fragment, ordered by clip-adjusted start.
///
/// `reads_for_processing` is what the downstream caller consumes: either one
/// stitched read or the untouched originals.
#[derive(Debug, Clone)]
pub struct AlignmentSet {
    partner_read1: Read,
    partner_read2: Option<Read>,
    pub reads_for_processing: Vec<Read>,
    pub is_stitched: bool,
}

impl AlignmentSet {
    /// Pair two reads of one fragment. Ties on clip-adjusted start keep the
    /// given order. With `ready_to_process` the output list is seeded with
    /// the unmerged reads.
    pub fn new(read1: Read, read2: Option<Read>, ready_to_process: bool) -> Self {
        let (partner_read1, partner_read2) = match read2 {
            Some(read2) if read1.clip_adjusted_position() > read2.clip_adjusted_position() => {
                (read2, Some(read1))
            }
            read2 => (read1, read2),
        };

        let mut set = AlignmentSet {
            partner_read1,
            partner_read2,
            reads_for_processing: Vec::with_capacity(2),
            is_stitched: false,
        };
        if ready_to_process {
            set.use_unstitched_reads();
        }
        set
    }

    pub fn partner_read1(&self) -> &Read {
        &self.partner_read1
    }

    pub fn partner_read2(&self) -> Option<&Read> {
        self.partner_read2.as_ref()
    }

    pub fn is_full_pair(&self) -> bool {
        self.partner_read2.is_some()
    }

    /// Replace the output with copies of the original reads
    pub fn use_unstitched_reads(&mut self) {
        self.reads_for_processing.clear();
        self.reads_for_processing.push(self.partner_read1.clone());
        if let Some(read2) = &self.partner_read2 {
            self.reads_for_processing.push(read2.clone());
        }
        self.is_stitched = false;
    }

    /// Consume the set, returning the reads for downstream processing
    pub fn into_reads_for_processing(self) -> Vec<Read> {
        self.reads_for_processing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::tests::record;

    fn read(name: &str, bases: &str, position: i32, cigar: &str) -> Read {
        let mut rec = record(bases, (position - 1) as i64, cigar);
        rec.name = name.to_string();
        Read::new("chr1", &rec).unwrap()
    }

    #[test]
    fn test_single_read() {
        let set = AlignmentSet::new(read("r1", "ACGT", 10, "4M"), None, false);
        assert!(!set.is_full_pair());
        assert_eq!(set.partner_read1().name(), "r1");
        assert!(set.partner_read2().is_none());
        assert!(set.reads_for_processing.is_empty());

        let set = AlignmentSet::new(read("r1", "ACGT", 10, "4M"), None, true);
        assert_eq!(set.reads_for_processing.len(), 1);
    }

    #[test]
    fn test_ordering_by_clip_adjusted_start() {
        let early = read("early", "ACGTACGT", 10, "8M");
        let late = read("late", "ACGTACGT", 12, "8M");

        let set = AlignmentSet::new(late.clone(), Some(early.clone()), false);
        assert!(set.is_full_pair());
        assert_eq!(set.partner_read1().name(), "early");
        assert_eq!(set.partner_read2().unwrap().name(), "late");

        let set = AlignmentSet::new(early, Some(late), false);
        assert_eq!(set.partner_read1().name(), "early");

        // Same position, but the second read's soft-clip starts earlier
        let a = read("a", "ACGTACGT", 20, "2S6M");
        let b = read("b", "ACGTACGT", 20, "4S4M");
        let set = AlignmentSet::new(a, Some(b), false);
        assert_eq!(set.partner_read1().name(), "b");
    }

    #[test]
    fn test_ties_keep_given_order() {
        let a = read("a", "CATATAGG", 1, "3M3I2M");
        let b = read("b", "ATAGGTAA", 4, "3S5M");
        let set = AlignmentSet::new(a.clone(), Some(b.clone()), false);
        assert_eq!(set.partner_read1().name(), "a");
        let set = AlignmentSet::new(b, Some(a), false);
        assert_eq!(set.partner_read1().name(), "b");
    }

    #[test]
    fn test_ready_to_process() {
        let r1 = read("r1", "ACGTACGT", 10, "8M");
        let r2 = read("r2", "ACGTACGT", 14, "8M");
        let set = AlignmentSet::new(r2.clone(), Some(r1.clone()), true);
        assert_eq!(set.reads_for_processing, vec![r1, r2]);
        assert!(!set.is_stitched);
    }
}
