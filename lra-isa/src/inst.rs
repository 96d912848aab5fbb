//! Instruction representation.

use lra_common::{HReg, VReg};

/// An opaque opcode handle. The allocator never switches on this value
/// itself — it always goes through [`crate::InstructionSet::describe`]
/// to find out what the opcode means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpCode(pub u32);

/// One operand field: either a virtual register, a hard register, or
/// unused (-1). Which of the two the non-negative case means depends on
/// whether the value is below the register file's hard-register count:
/// a virtual register id is a non-negative integer at or above the
/// number of hard registers in its file.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RegSlot(pub i32);

impl RegSlot {
    pub const UNUSED: RegSlot = RegSlot(-1);

    pub fn from_vreg(v: VReg) -> Self {
        RegSlot(v.0 as i32)
    }

    pub fn from_hreg(h: HReg) -> Self {
        RegSlot(h.0 as i32)
    }

    pub fn is_unused(self) -> bool {
        self.0 < 0
    }

    /// Whichever file this slot belongs to, is its numeric value still a
    /// virtual register (i.e. not yet allocated)?
    pub fn is_soft(self, num_hard_regs: u32) -> bool {
        self.0 >= num_hard_regs as i32
    }

    pub fn as_vreg(self) -> VReg {
        debug_assert!(self.0 >= 0);
        VReg(self.0 as u16)
    }

    pub fn as_hreg(self) -> HReg {
        debug_assert!(self.0 >= 0);
        HReg(self.0 as u8)
    }
}

impl std::fmt::Debug for RegSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unused() {
            write!(f, "-")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// One `(vreg, hreg)` ABI binding in a call's outgoing argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgBinding {
    pub vreg: VReg,
    pub hreg: HReg,
}

/// Extra fields carried only by instructions whose clobber class is
/// [`crate::ClobberClass::Call`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallInfo {
    pub out_ireg_args: Vec<ArgBinding>,
    pub out_freg_args: Vec<ArgBinding>,
}

/// A single machine instruction, pre- or post-allocation.
///
/// `base_reg`/`dest_base_reg` and `offset` exist only so spill stores and
/// reloads synthesized by the allocator (and any memory-addressing
/// opcode in a real descriptor table) have somewhere to record the base
/// register and byte offset they address; the allocator itself treats
/// them as opaque payload outside of the four register operand fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: OpCode,
    pub dreg: RegSlot,
    pub sreg1: RegSlot,
    pub sreg2: RegSlot,
    /// Hard register of the high half of a long-pair destination.
    /// Unused outside `dest == OperandClass::LongLo`.
    pub dreg_hi: RegSlot,
    pub base_reg: RegSlot,
    pub dest_base_reg: RegSlot,
    pub offset: i32,
    pub call: Option<CallInfo>,
}

impl Instruction {
    pub fn new(opcode: OpCode) -> Self {
        Instruction {
            opcode,
            dreg: RegSlot::UNUSED,
            sreg1: RegSlot::UNUSED,
            sreg2: RegSlot::UNUSED,
            dreg_hi: RegSlot::UNUSED,
            base_reg: RegSlot::UNUSED,
            dest_base_reg: RegSlot::UNUSED,
            offset: 0,
            call: None,
        }
    }

    pub fn with_dreg(mut self, v: VReg) -> Self {
        self.dreg = RegSlot::from_vreg(v);
        self
    }

    pub fn with_sreg1(mut self, v: VReg) -> Self {
        self.sreg1 = RegSlot::from_vreg(v);
        self
    }

    pub fn with_sreg2(mut self, v: VReg) -> Self {
        self.sreg2 = RegSlot::from_vreg(v);
        self
    }

    pub fn with_call(mut self, call: CallInfo) -> Self {
        self.call = Some(call);
        self
    }
}

/// Opcodes the allocator core synthesizes itself (spill stores/reloads,
/// register-to-register copies) rather than looking up in a descriptor
/// table. Reserved below 1000 so a real architecture's opcodes never
/// collide with them; these are never passed to
/// [`crate::InstructionSet::describe`].
pub mod synth {
    use super::OpCode;

    pub const COPY_I: OpCode = OpCode(0);
    pub const COPY_F: OpCode = OpCode(1);
    pub const SPILL_STORE_I: OpCode = OpCode(2);
    pub const SPILL_LOAD_I: OpCode = OpCode(3);
    pub const SPILL_STORE_F: OpCode = OpCode(4);
    pub const SPILL_LOAD_F: OpCode = OpCode(5);
}
