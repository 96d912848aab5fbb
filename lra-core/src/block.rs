//! The input/output contract of a single allocation pass (spec.md section 6).

use lra_isa::Instruction;

/// A straight-line instruction stream handed to the allocator, plus the
/// bound on virtual register ids used in it per file. `max_ireg`/
/// `max_freg` are "one past the highest virtual register id used in
/// this block" for their respective file, exactly as spec.md section 6
/// describes; an empty `code` is a legal, trivial block.
#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    pub code: Vec<Instruction>,
    pub max_ireg: u32,
    pub max_freg: u32,
}

impl BasicBlock {
    pub fn new(code: Vec<Instruction>, max_ireg: u32, max_freg: u32) -> Self {
        BasicBlock {
            code,
            max_ireg,
            max_freg,
        }
    }
}
