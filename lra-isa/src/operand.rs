//! The descriptor slot alphabet.
//!
//! The system this allocator is modeled on encodes these as single
//! ASCII characters (`'f'`, `'L'`, `'b'`, ...); that's a source-specific
//! spelling rather than a design choice, so this port uses an
//! enumerated sum type per slot instead.

use lra_common::HReg;

/// What kind of value an operand slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandClass {
    /// The slot is not used by this opcode.
    None,
    Int,
    Float,
    /// Low half of a 64-bit value split across two adjacent vregs.
    LongLo,
    /// High half of a 64-bit value split across two adjacent vregs.
    LongHi,
    /// A base register used only to address memory; it is read, never
    /// killed as a value (`killed_in` is not updated for it).
    Base,
}

impl OperandClass {
    pub fn is_used(self) -> bool {
        !matches!(self, OperandClass::None)
    }

    pub fn is_float(self) -> bool {
        matches!(self, OperandClass::Float)
    }

    /// Long-pair halves mirror their liveness update onto `v+1`.
    pub fn is_long_pair(self) -> bool {
        matches!(self, OperandClass::LongLo | OperandClass::LongHi)
    }

    /// A destination class that is *not* `Base` kills the previous value.
    pub fn kills_on_write(self) -> bool {
        self.is_used() && !matches!(self, OperandClass::Base)
    }
}

/// What an instruction's clobber slot means, beyond the three named
/// operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClobberClass {
    None,
    /// Clobbers every caller-saved register in both files (except the
    /// operands explicitly exempted during the destination/src1 phases).
    Call,
    /// Destination must equal src1; the allocator inserts a copy when it
    /// doesn't.
    SameAsSrc1,
    /// FP result is materialised straight to memory; FP-stack
    /// maintenance (Phase B) is skipped for this instruction.
    FpStoreToMemory,
    /// Shift-style: src2 must land in a specific register (typically
    /// ECX-equivalent) and src1 is forbidden there.
    Shift,
    /// This instruction clobbers exactly one hard register that is not
    /// named as any of dest/src1/src2.
    Fixed(HReg),
}

impl ClobberClass {
    pub fn is_call(self) -> bool {
        matches!(self, ClobberClass::Call)
    }

    pub fn fixed_reg(self) -> Option<HReg> {
        match self {
            ClobberClass::Fixed(h) => Some(h),
            _ => None,
        }
    }
}
