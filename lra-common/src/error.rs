//! Fatal error kinds for the local register allocator.
//!
//! Every variant here is a programmer error (a bug in the descriptor
//! table, an invariant violation, or an impossibly constrained
//! allocation request) — never a condition a caller can recover from.
//! Call sites within `lra-isa`/`lra-core` still propagate it as a normal
//! `Result<_, AllocError>` with `?`, the same way `rcc-common::CompilerError`
//! is threaded through `rcc-frontend`/`rcc-ir`; only the outermost caller
//! (`lra-driver`) is expected to treat an `Err` as fatal and panic. The
//! enum exists so call sites can propagate a typed error instead of
//! panicking deep inside the allocator, and so tests can assert on
//! *which* invariant failed.

use thiserror::Error;

use crate::ids::{HReg, VReg};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("unknown opcode: {mnemonic}")]
    UnknownOpcode { mnemonic: String },

    #[error("no free register left to spill (mask exhausted after exclusions)")]
    NoFreeRegisterToSpill,

    #[error("assignment mismatch: expected virtual register, got {got:?}")]
    AssignmentMismatch { got: VReg },

    #[error("{vreg:?} already bound to {existing:?}, cannot rebind to {requested:?}")]
    DoubleBinding {
        vreg: VReg,
        existing: HReg,
        requested: HReg,
    },
}

impl AllocError {
    pub fn unknown_opcode(mnemonic: impl Into<String>) -> Self {
        AllocError::UnknownOpcode {
            mnemonic: mnemonic.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_human_readable() {
        let err = AllocError::unknown_opcode("OP_WEIRD");
        assert_eq!(err.to_string(), "unknown opcode: OP_WEIRD");
    }

    #[test]
    fn double_binding_carries_both_registers() {
        let err = AllocError::DoubleBinding {
            vreg: VReg(10),
            existing: HReg(1),
            requested: HReg(2),
        };
        assert!(err.to_string().contains("already bound"));
    }
}
