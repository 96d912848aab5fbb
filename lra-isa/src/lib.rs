//! The opcode descriptor contract (component C1 of the local register
//! allocator) plus one concrete demonstration architecture.
//!
//! This crate is the boundary the allocator core (`lra-core`) never
//! reaches past: given an opcode, it answers "what class of value does
//! each operand slot hold, what does this instruction clobber, and is
//! any operand pinned to a specific hard register". The allocator
//! trusts these answers completely; reproducing the *exact* fixed
//! assignments and masks for a real target is explicitly the
//! implementer's job, not this crate's (spec section 4.1).

pub mod demo;
pub mod desc;
pub mod inst;
pub mod operand;

pub use desc::{InstructionSet, OpDesc};
pub use inst::{ArgBinding, CallInfo, Instruction, OpCode, RegSlot};
pub use operand::{ClobberClass, OperandClass};
