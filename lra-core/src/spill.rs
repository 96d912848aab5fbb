//! Spill slot allocator (C2).
//!
//! Two dense tables, keyed by spill index, mapping to a frame offset.
//! Offsets are issued once and never change ("spill monotonicity"); the
//! two files have disjoint index spaces, though the system this is
//! modeled on draws the *name* of the next spill from one shared
//! counter — we surface that as `total_issued`, used only for
//! reporting, since nothing in the algorithm actually depends on the
//! two files' indices interleaving.

use lra_common::RegisterFile;

const POINTER_SIZE: i32 = 8;
const DOUBLE_SIZE: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpillSlot {
    pub index: u32,
    pub file: RegisterFile,
}

#[derive(Debug, Default)]
pub struct SpillSlots {
    int_offsets: Vec<i32>,
    float_offsets: Vec<i32>,
    frame_size: i32,
}

impl SpillSlots {
    pub fn new() -> Self {
        SpillSlots::default()
    }

    /// Allocate a fresh spill slot in `file`, extending the frame.
    /// Reuse within a block is never attempted.
    pub fn alloc(&mut self, file: RegisterFile) -> SpillSlot {
        let size = match file {
            RegisterFile::Int => POINTER_SIZE,
            RegisterFile::Float => DOUBLE_SIZE,
        };
        let offset = self.frame_size;
        self.frame_size += size;
        let table = match file {
            RegisterFile::Int => &mut self.int_offsets,
            RegisterFile::Float => &mut self.float_offsets,
        };
        let index = table.len() as u32;
        table.push(offset);
        SpillSlot { index, file }
    }

    /// The frame offset of a previously issued slot; stable across
    /// repeated lookups (invariant 4).
    pub fn offset_of(&self, slot: SpillSlot) -> i32 {
        let table = match slot.file {
            RegisterFile::Int => &self.int_offsets,
            RegisterFile::Float => &self.float_offsets,
        };
        table[slot.index as usize]
    }

    pub fn frame_size(&self) -> i32 {
        self.frame_size
    }

    pub fn total_issued(&self) -> usize {
        self.int_offsets.len() + self.float_offsets.len()
    }
}
