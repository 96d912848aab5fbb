//! A small, self-consistent demonstration architecture.
//!
//! The allocator core treats the descriptor table as an external
//! collaborator "given" by the surrounding compiler; since this crate
//! has no real instruction-selection front end to hand it one,
//! `DemoIsa` plays that role. It covers exactly the operand shapes the
//! scenario tests exercise: a plain move, a destructive two-operand
//! add (register pressure), a fixed-destination op, a shift with a
//! fixed/forbidden src2 register, a call with outgoing argument
//! bindings, and a long-pair-producing op — plus float analogues of
//! the binary and move forms, in both flat and FP-stack register-file
//! shapes, and a float load with no float source to let FP-stack depth
//! actually build up under pressure.
//!
//! Four hard registers per file, all caller-saved, none reserved.

use std::collections::HashMap;

use lra_common::HReg;

use crate::desc::{InstructionSet, OpDesc};
use crate::inst::OpCode;
use crate::operand::{ClobberClass, OperandClass};

pub const NUM_HARD_REGS: u32 = 4;

/// Hard register standing in for EAX, the low half of a long-pair result.
pub const EAX: HReg = HReg(0);
/// Hard register standing in for ECX in shift src2 constraints.
pub const ECX: HReg = HReg(2);
/// Hard register standing in for EDX, the high half of a long pair.
pub const EDX: HReg = HReg(3);

pub mod op {
    use super::OpCode;

    pub const MOVE: OpCode = OpCode(1000);
    pub const ADD: OpCode = OpCode(1001);
    pub const SUB: OpCode = OpCode(1002);
    pub const CALL: OpCode = OpCode(1003);
    pub const SHL: OpCode = OpCode(1004);
    pub const MUL_LONG: OpCode = OpCode(1005);
    pub const FMOVE: OpCode = OpCode(1100);
    pub const FADD: OpCode = OpCode(1101);
    pub const FSTORE_MEM: OpCode = OpCode(1102);
    /// Loads a float from memory with no float source operand of its
    /// own — the one op in this table that can grow FP-stack depth
    /// without an equal-or-greater number of uses in the same
    /// instruction. Real architectures have several such ops (load
    /// immediate, load from memory, load a global); this demo table
    /// needs only one to exercise C6 under register pressure.
    pub const FLOAD: OpCode = OpCode(1103);
}

/// `DemoIsa` additionally tracks, per opcode, whether it participates in
/// the same-register move-hint optimisation; that bit is not part of
/// [`OpDesc`] proper because it is a property of *which* opcode an
/// instruction is, not of its operand shape.
pub struct DemoIsa {
    descs: HashMap<OpCode, OpDesc>,
    moves: HashMap<OpCode, bool>,
    fp_stack: bool,
    /// Integer hard registers excluded from `caller_saved_iregs()` —
    /// callee-saved ("global") registers that may still appear as
    /// pre-assigned operands, per spec.md section 3, but are never
    /// themselves bound or freed by the allocator.
    reserved_global_iregs: u32,
}

impl DemoIsa {
    /// A flat float register file, same shape as the integer file.
    pub fn flat() -> Self {
        Self::build(false)
    }

    /// A depth-limited x87-style float stack.
    pub fn fp_stack() -> Self {
        Self::build(true)
    }

    /// Same as [`Self::flat`], but reserves `EDX` (`HReg(3)`) as a
    /// callee-saved global register rather than a caller-saved one —
    /// exists so a scenario can exercise an operand that arrives already
    /// bound to a global hard register instead of a virtual one.
    pub fn flat_with_global() -> Self {
        let mut isa = Self::build(false);
        isa.reserved_global_iregs = 1 << EDX.0;
        isa
    }

    fn build(fp_stack: bool) -> Self {
        let mut descs = HashMap::new();
        let mut moves = HashMap::new();

        descs.insert(
            op::MOVE,
            OpDesc {
                dest: OperandClass::Int,
                src1: OperandClass::Int,
                src2: OperandClass::None,
                clob: ClobberClass::None,
                dest_fixed: None,
                src1_fixed: None,
                src2_fixed: None,
                dest_fixed_hi: None,
                src2_forbidden_mask: 0,
            },
        );
        moves.insert(op::MOVE, true);

        descs.insert(
            op::ADD,
            OpDesc {
                dest: OperandClass::Int,
                src1: OperandClass::Int,
                src2: OperandClass::Int,
                clob: ClobberClass::SameAsSrc1,
                dest_fixed: None,
                src1_fixed: None,
                src2_fixed: None,
                dest_fixed_hi: None,
                src2_forbidden_mask: 0,
            },
        );

        descs.insert(
            op::SUB,
            OpDesc {
                dest: OperandClass::Int,
                src1: OperandClass::Int,
                src2: OperandClass::Int,
                clob: ClobberClass::Fixed(HReg(1)),
                dest_fixed: Some(HReg(1)),
                src1_fixed: None,
                src2_fixed: None,
                dest_fixed_hi: None,
                src2_forbidden_mask: 0,
            },
        );

        descs.insert(
            op::CALL,
            OpDesc {
                dest: OperandClass::Int,
                src1: OperandClass::Int,
                src2: OperandClass::None,
                clob: ClobberClass::Call,
                dest_fixed: None,
                src1_fixed: None,
                src2_fixed: None,
                dest_fixed_hi: None,
                src2_forbidden_mask: 0,
            },
        );

        descs.insert(
            op::SHL,
            OpDesc {
                dest: OperandClass::Int,
                src1: OperandClass::Int,
                src2: OperandClass::Int,
                clob: ClobberClass::Shift,
                dest_fixed: None,
                src1_fixed: None,
                src2_fixed: Some(ECX),
                dest_fixed_hi: None,
                src2_forbidden_mask: 0,
            },
        );

        descs.insert(
            op::MUL_LONG,
            OpDesc {
                dest: OperandClass::LongLo,
                src1: OperandClass::Int,
                src2: OperandClass::Int,
                clob: ClobberClass::None,
                dest_fixed: Some(EAX),
                src1_fixed: None,
                src2_fixed: None,
                dest_fixed_hi: Some(EDX),
                src2_forbidden_mask: 0,
            },
        );

        descs.insert(
            op::FMOVE,
            OpDesc {
                dest: OperandClass::Float,
                src1: OperandClass::Float,
                src2: OperandClass::None,
                clob: ClobberClass::None,
                dest_fixed: None,
                src1_fixed: None,
                src2_fixed: None,
                dest_fixed_hi: None,
                src2_forbidden_mask: 0,
            },
        );

        descs.insert(
            op::FADD,
            OpDesc {
                dest: OperandClass::Float,
                src1: OperandClass::Float,
                src2: OperandClass::Float,
                clob: ClobberClass::None,
                dest_fixed: None,
                src1_fixed: None,
                src2_fixed: None,
                dest_fixed_hi: None,
                src2_forbidden_mask: 0,
            },
        );

        descs.insert(
            op::FLOAD,
            OpDesc {
                dest: OperandClass::Float,
                src1: OperandClass::None,
                src2: OperandClass::None,
                clob: ClobberClass::None,
                dest_fixed: None,
                src1_fixed: None,
                src2_fixed: None,
                dest_fixed_hi: None,
                src2_forbidden_mask: 0,
            },
        );

        descs.insert(
            op::FSTORE_MEM,
            OpDesc {
                dest: OperandClass::None,
                src1: OperandClass::Float,
                src2: OperandClass::None,
                clob: ClobberClass::FpStoreToMemory,
                dest_fixed: None,
                src1_fixed: None,
                src2_fixed: None,
                dest_fixed_hi: None,
                src2_forbidden_mask: 0,
            },
        );

        DemoIsa {
            descs,
            moves,
            fp_stack,
            reserved_global_iregs: 0,
        }
    }

}

impl InstructionSet for DemoIsa {
    fn describe(&self, op: OpCode) -> Option<&OpDesc> {
        self.descs.get(&op)
    }

    fn num_hard_iregs(&self) -> u32 {
        NUM_HARD_REGS
    }

    fn num_hard_fregs(&self) -> u32 {
        NUM_HARD_REGS
    }

    fn caller_saved_iregs(&self) -> u32 {
        ((1 << NUM_HARD_REGS) - 1) & !self.reserved_global_iregs
    }

    fn caller_saved_fregs(&self) -> u32 {
        (1 << NUM_HARD_REGS) - 1
    }

    fn uses_fp_stack(&self) -> bool {
        self.fp_stack
    }

    fn fp_stack_size(&self) -> u32 {
        NUM_HARD_REGS
    }

    fn is_move(&self, op: OpCode) -> bool {
        self.moves.get(&op).copied().unwrap_or(false)
    }
}
