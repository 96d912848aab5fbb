//! Virtual and hard register identifiers.
//!
//! A [`VReg`] never carries its own file tag: whether a given operand's
//! vreg belongs to the integer or float file is always determined by
//! the opcode descriptor for the operand slot it occupies, exactly as
//! in the system this crate ports (the same numeric space is reused by
//! both files; only the descriptor disambiguates).

use std::fmt;

/// A symbolic (virtual) register id, unbounded in practice, assigned by
/// whatever instruction-selection front end produced the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VReg(pub u16);

impl VReg {
    /// The sibling half of a long-pair vreg (`v`, `v+1`).
    pub fn pair_high(self) -> VReg {
        VReg(self.0 + 1)
    }
}

impl fmt::Debug for VReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A concrete hard register id, meaningful only relative to a
/// [`RegisterFile`] — `HReg(0)` in the integer file and `HReg(0)` in the
/// float file name unrelated registers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HReg(pub u8);

impl fmt::Debug for HReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// The two disjoint register files an operand may belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterFile {
    Int,
    Float,
}

impl RegisterFile {
    pub fn is_float(self) -> bool {
        matches!(self, RegisterFile::Float)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_high_is_next_id() {
        assert_eq!(VReg(6).pair_high(), VReg(7));
    }

    #[test]
    fn debug_format_is_readable() {
        assert_eq!(format!("{:?}", VReg(4)), "v4");
        assert_eq!(format!("{:?}", HReg(2)), "h2");
    }
}
