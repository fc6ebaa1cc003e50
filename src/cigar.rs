//! Run-length alignment descriptors (CIGAR strings)
//!
//! Only the four operations a stitched read can carry are supported:
//! `M` (match), `I` (insertion), `D` (deletion) and `S` (soft-clip).

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum CigarParseErr {
    Empty,
    MissingLength(char),
    LeadingZero,
    LengthOverflow,
    UnsupportedOperation(char),
    TrailingLength,
}

impl fmt::Display for CigarParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CigarParseErr::Empty => write!(f, "Empty CIGAR string"),
            CigarParseErr::MissingLength(op) => {
                write!(f, "CIGAR operation '{}' has no length", op)
            }
            CigarParseErr::LeadingZero => write!(f, "CIGAR length has a leading zero"),
            CigarParseErr::LengthOverflow => write!(f, "CIGAR length is too large"),
            CigarParseErr::UnsupportedOperation(op) => {
                write!(f, "Unsupported CIGAR operation '{}'", op)
            }
            CigarParseErr::TrailingLength => write!(f, "CIGAR string ends with a length"),
        }
    }
}

impl std::error::Error for CigarParseErr {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CigarKind {
    Match,
    Insertion,
    Deletion,
    SoftClip,
}

impl CigarKind {
    pub fn from_char(op: char) -> Option<Self> {
        match op {
            'M' => Some(CigarKind::Match),
            'I' => Some(CigarKind::Insertion),
            'D' => Some(CigarKind::Deletion),
            'S' => Some(CigarKind::SoftClip),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            CigarKind::Match => 'M',
            CigarKind::Insertion => 'I',
            CigarKind::Deletion => 'D',
            CigarKind::SoftClip => 'S',
        }
    }

    /// Whether the operation consumes bases of the read
    pub fn consumes_read(self) -> bool {
        !matches!(self, CigarKind::Deletion)
    }

    /// Whether the operation consumes reference positions
    pub fn consumes_reference(self) -> bool {
        matches!(self, CigarKind::Match | CigarKind::Deletion)
    }

    fn from_bits(bits: u32) -> Self {
        match bits {
            0 => CigarKind::Match,
            1 => CigarKind::Insertion,
            2 => CigarKind::Deletion,
            _ => CigarKind::SoftClip,
        }
    }
}

/// A single operation, packed as in BAM: kind in the top bits, length below.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CigarOp {
    val: u32,
}

impl CigarOp {
    const KIND_SHIFT: u32 = 29;
    pub const MAX_LEN: u32 = (1 << Self::KIND_SHIFT) - 1;

    /// Lengths above [`CigarOp::MAX_LEN`] must go through [`CigarOp::try_new`]
    pub fn new(len: u32, kind: CigarKind) -> Self {
        debug_assert!(len <= Self::MAX_LEN);
        Self {
            val: ((kind as u32) << Self::KIND_SHIFT) | (len & Self::MAX_LEN),
        }
    }

    pub fn try_new(len: u32, kind: CigarKind) -> Result<Self, CigarParseErr> {
        if len > Self::MAX_LEN {
            return Err(CigarParseErr::LengthOverflow);
        }
        Ok(Self::new(len, kind))
    }

    pub fn kind(&self) -> CigarKind {
        CigarKind::from_bits(self.val >> Self::KIND_SHIFT)
    }

    pub fn op(&self) -> char {
        self.kind().as_char()
    }

    pub fn len(&self) -> u32 {
        self.val & Self::MAX_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read_delta(&self) -> u32 {
        if self.kind().consumes_read() {
            self.len()
        } else {
            0
        }
    }

    pub fn reference_delta(&self) -> u32 {
        if self.kind().consumes_reference() {
            self.len()
        } else {
            0
        }
    }

    fn adjust_len(&mut self, length_delta: u32) -> Result<(), CigarParseErr> {
        let len = self
            .len()
            .checked_add(length_delta)
            .ok_or(CigarParseErr::LengthOverflow)?;
        *self = CigarOp::try_new(len, self.kind())?;
        Ok(())
    }
}

impl fmt::Debug for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len(), self.op())
    }
}

/// Ordered, immutable list of alignment operations.
///
/// The empty descriptor stands for "no alignment" and is written as `*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cigar {
    ops: Vec<CigarOp>,
}

impl Cigar {
    pub fn new(ops: Vec<CigarOp>) -> Self {
        Cigar { ops }
    }

    /// Build a descriptor, merging neighbouring operations of the same kind
    /// and dropping zero-length ones. Fails if a merged length overflows.
    pub fn collapsed<I: IntoIterator<Item = CigarOp>>(ops: I) -> Result<Self, CigarParseErr> {
        let mut merged: Vec<CigarOp> = Vec::new();
        for op in ops {
            if op.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.kind() == op.kind() => last.adjust_len(op.len())?,
                _ => merged.push(op),
            }
        }
        Ok(Cigar { ops: merged })
    }

    pub fn ops(&self) -> &[CigarOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of read bases described (M, I and S)
    pub fn read_span(&self) -> u32 {
        self.ops.iter().map(CigarOp::read_delta).sum()
    }

    /// Number of reference positions covered (M and D)
    pub fn reference_span(&self) -> u32 {
        self.ops.iter().map(CigarOp::reference_delta).sum()
    }

    pub fn prefix_clip(&self) -> u32 {
        match self.ops.first() {
            Some(op) if op.kind() == CigarKind::SoftClip => op.len(),
            _ => 0,
        }
    }

    pub fn suffix_clip(&self) -> u32 {
        match self.ops.last() {
            Some(op) if op.kind() == CigarKind::SoftClip => op.len(),
            _ => 0,
        }
    }

    /// Same operations in reverse order
    pub fn reversed(&self) -> Cigar {
        Cigar {
            ops: self.ops.iter().rev().copied().collect(),
        }
    }
}

impl FromStr for Cigar {
    type Err = CigarParseErr;

    fn from_str(cigar: &str) -> Result<Self, Self::Err> {
        if cigar == "*" {
            return Ok(Cigar::default());
        }
        if cigar.is_empty() {
            return Err(CigarParseErr::Empty);
        }

        let mut ops = Vec::new();
        let mut len: u64 = 0;
        let mut digits = 0usize;

        for c in cigar.chars() {
            if let Some(d) = c.to_digit(10) {
                if digits == 1 && len == 0 {
                    return Err(CigarParseErr::LeadingZero);
                }
                len = len * 10 + d as u64;
                digits += 1;
                if len > CigarOp::MAX_LEN as u64 {
                    return Err(CigarParseErr::LengthOverflow);
                }
            } else {
                let kind = CigarKind::from_char(c).ok_or(CigarParseErr::UnsupportedOperation(c))?;
                if digits == 0 {
                    return Err(CigarParseErr::MissingLength(c));
                }
                ops.push(CigarOp::new(len as u32, kind));
                len = 0;
                digits = 0;
            }
        }

        if digits > 0 {
            return Err(CigarParseErr::TrailingLength);
        }

        Ok(Cigar { ops })
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "*");
        }
        for op in &self.ops {
            write!(f, "{}{}", op.len(), op.op())?;
        }
        Ok(())
    }
}
