//! Liveness, spill bookkeeping, and the allocation core of the local
//! (basic-block) register allocator.
//!
//! This crate owns components C2 through C6 of the design
//! (spill slots, register state, the forward liveness pass, the reverse
//! allocator core, and the FP-stack tracker) plus the instruction-list
//! representation they share. The opcode descriptor contract those
//! components consult (C1) lives in `lra-isa`, one layer below; this
//! crate never interprets an opcode except through
//! [`lra_isa::InstructionSet::describe`].
//!
//! The only entry point a caller needs is [`allocate_block`].

pub mod alloc;
pub mod block;
pub mod fpstack;
pub mod list;
pub mod liveness;
pub mod spill;
pub mod state;

pub use alloc::{allocate_block, AllocatedBlock};
pub use block::BasicBlock;
pub use spill::{SpillSlot, SpillSlots};
pub use state::{Assignment, RegisterFileState};
