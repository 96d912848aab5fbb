//! FP-stack tracker (C6).
//!
//! The system this allocator is modeled on reuses the generic register
//! state's free-mask bitset to encode FP-stack depth, with semantics
//! that don't match how the bitmask is used everywhere else in that same
//! object. This models the stack as its own small component instead:
//! outside FP-stack mode it is entirely inert (`uses_fp_stack() ==
//! false` on the [`lra_isa::InstructionSet`] in play), and inside it, it
//! only ever answers "does this def/use overflow or refill the depth
//! limit" — the reverse pass never calls the generic allocator for FP
//! operands in this mode; it uses the needs-spill/needs-load/needs-
//! load-spill flags precomputed here instead.

use std::collections::VecDeque;

/// Which operand slot of an instruction an FP occurrence flag belongs
/// to. FP-stack flags are occurrence-scoped, not vreg-scoped: the same
/// virtual register can need a load at one use and not at another
/// depending on how full the stack is at that point in the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandRole {
    Dest,
    Src1,
    Src2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FpOccurrenceFlags {
    pub needs_load: bool,
    pub needs_spill: bool,
    pub needs_load_spill: bool,
}

/// A depth-limited simulation of the x87-style stack, run once forward
/// (to compute flags) and driven again, independently, by the reverse
/// pass as it actually emits spill stores and reload loads.
pub struct FpStack {
    capacity: u32,
    depth: u32,
    pending_spills: VecDeque<u32>,
    next_seq: u32,
}

impl FpStack {
    pub fn new(capacity: u32) -> Self {
        FpStack {
            capacity,
            depth: 0,
            pending_spills: VecDeque::new(),
            next_seq: 0,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// A fresh FP value is about to be defined. If the stack has no
    /// room, schedule an eviction and report `needs_spill`.
    pub fn observe_def(&mut self) -> FpOccurrenceFlags {
        let mut flags = FpOccurrenceFlags::default();
        if self.depth >= self.capacity {
            self.pending_spills.push_back(self.next_seq);
            self.next_seq += 1;
            flags.needs_spill = true;
        } else {
            self.depth += 1;
        }
        flags
    }

    /// An FP value is about to be read as src1 or src2. If it was
    /// previously evicted by `observe_def`, it must be reloaded; if
    /// there's no room left to hold the reloaded value, an extra spill
    /// must run first (`needs_load_spill` instead of plain
    /// `needs_load`).
    pub fn observe_use(&mut self) -> FpOccurrenceFlags {
        let mut flags = FpOccurrenceFlags::default();
        if let Some(_) = self.pending_spills.pop_front() {
            if self.depth >= self.capacity {
                flags.needs_load_spill = true;
            } else {
                flags.needs_load = true;
                self.depth += 1;
            }
        }
        if self.depth > 0 {
            self.depth -= 1;
        }
        flags
    }
}
