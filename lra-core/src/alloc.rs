//! Allocator core (C5) — the reverse pass.
//!
//! This is where the other five components meet: for each instruction,
//! walked in reverse program order, the phases below resolve fixed
//! operand hints, FP-stack bookkeeping, the destination, clobbers,
//! outgoing call arguments, and finally src1/src2, in that fixed order,
//! inserting spill stores, reload loads, and copies as needed. Every
//! mutation to the register state within a phase completes before the
//! next phase reads it — phases are never interleaved.
//!
//! Some of the original's more surgical optimisations (e.g. Phase C's
//! "move the destination out of the way instead of spilling it" path
//! when a fixed src2 register collides with an already-bound
//! destination) are folded here into the same general force-spill
//! fallback used elsewhere. This produces correct, if occasionally less
//! minimal, code; see DESIGN.md.

use log::{debug, trace};

use lra_common::{AllocError, HReg, RegisterFile, VReg};
use lra_isa::inst::synth;
use lra_isa::{ClobberClass, Instruction, InstructionSet, RegSlot};

use crate::block::BasicBlock;
use crate::fpstack::OperandRole;
use crate::list::{InstrList, NodeId};
use crate::liveness::{self, LivenessResult};
use crate::spill::{SpillSlot, SpillSlots};
use crate::state::{Assignment, RegisterFileState};

/// A hard register reserved purely for addressing spill slots; never a
/// member of either file's allocatable set. Synthesized spill stores
/// and reloads carry it in `base_reg` as opaque addressing payload.
pub const SPILL_BASE_REG: HReg = HReg(255);

/// Stack-top sentinel every FP-stack-managed operand is rewritten to:
/// x87-style instructions operate implicitly on the top of the stack,
/// so there is exactly one meaningful "hard register" once an
/// architecture is in this mode.
pub const FP_STACK_TOP: HReg = HReg(0);

pub struct AllocatedBlock {
    pub instructions: Vec<Instruction>,
    pub frame_size: i32,
    pub spills_issued: usize,
}

struct AllocCtx<'a> {
    isa: &'a dyn InstructionSet,
    iregs: RegisterFileState,
    fregs: RegisterFileState,
    spills: SpillSlots,
    /// Spill slots created at an FP-stack `needs_load` site, awaiting
    /// the matching def's `needs_spill` store (see `fpstack` module doc
    /// and DESIGN.md for why this pairing runs producer-after-consumer).
    fp_awaiting_store: Vec<SpillSlot>,
}

impl<'a> AllocCtx<'a> {
    fn new(isa: &'a dyn InstructionSet, max_ireg: u32, max_freg: u32) -> Self {
        AllocCtx {
            iregs: RegisterFileState::new(
                RegisterFile::Int,
                isa.num_hard_iregs(),
                isa.caller_saved_iregs(),
                max_ireg,
            ),
            fregs: RegisterFileState::new(
                RegisterFile::Float,
                isa.num_hard_fregs(),
                isa.caller_saved_fregs(),
                max_freg,
            ),
            spills: SpillSlots::new(),
            fp_awaiting_store: Vec::new(),
            isa,
        }
    }

    fn state(&self, file: RegisterFile) -> &RegisterFileState {
        match file {
            RegisterFile::Int => &self.iregs,
            RegisterFile::Float => &self.fregs,
        }
    }

    fn state_mut(&mut self, file: RegisterFile) -> &mut RegisterFileState {
        match file {
            RegisterFile::Int => &mut self.iregs,
            RegisterFile::Float => &mut self.fregs,
        }
    }

    /// `get_register_force_spilling`: evict whatever vreg currently
    /// holds `h`, insert a reload for it after the current instruction,
    /// then reserve `h` again for the caller.
    fn force_spill(
        &mut self,
        list: &mut InstrList,
        at: NodeId,
        file: RegisterFile,
        h: HReg,
    ) -> Result<(), AllocError> {
        let v = self
            .state(file)
            .symbolic(h)
            .ok_or(AllocError::NoFreeRegisterToSpill)?;
        let slot = self.spills.alloc(file);
        trace!("force-spilling {v:?} out of {h:?} into slot {}", slot.index);
        self.state_mut(file).mark_spilled(v, slot);
        self.state_mut(file).free(h);
        let offset = self.spills.offset_of(slot);
        emit_load(list, at, file, h, offset, true);
        let reserved = self.state_mut(file).alloc(1 << h.0);
        debug_assert_eq!(reserved, Some(h));
        Ok(())
    }

    /// `get_register_spilling`: pick the lowest free-or-occupied bit in
    /// `mask` (excluding `exclude`, to avoid colliding with this
    /// instruction's own operands), forcing a spill if necessary.
    fn get_register_spilling(
        &mut self,
        list: &mut InstrList,
        at: NodeId,
        file: RegisterFile,
        mask: u32,
        exclude: u32,
    ) -> Result<HReg, AllocError> {
        let candidates = self.state(file).allocatable_mask() & mask & !exclude;
        if candidates == 0 {
            return Err(AllocError::NoFreeRegisterToSpill);
        }
        let h = HReg(candidates.trailing_zeros() as u8);
        if self.state(file).is_free(h) {
            self.state_mut(file).alloc(1 << h.0);
        } else {
            self.force_spill(list, at, file, h)?;
        }
        Ok(h)
    }

    fn alloc_or_spill(
        &mut self,
        list: &mut InstrList,
        at: NodeId,
        file: RegisterFile,
        mask: u32,
    ) -> Result<HReg, AllocError> {
        match self.state_mut(file).alloc(mask) {
            Some(h) => Ok(h),
            None => self.get_register_spilling(list, at, file, mask, 0),
        }
    }
}

fn emit_load(list: &mut InstrList, at: NodeId, file: RegisterFile, dst: HReg, offset: i32, after: bool) {
    trace!("emit reload {file:?} {dst:?} <- [spill+{offset}] ({})", if after { "after" } else { "before" });
    let op = if file.is_float() { synth::SPILL_LOAD_F } else { synth::SPILL_LOAD_I };
    let mut ins = Instruction::new(op);
    ins.dreg = RegSlot::from_hreg(dst);
    ins.base_reg = RegSlot::from_hreg(SPILL_BASE_REG);
    ins.offset = offset;
    if after {
        list.insert_after(at, ins);
    } else {
        list.insert_before(at, ins);
    }
}

fn emit_store(list: &mut InstrList, at: NodeId, file: RegisterFile, src: HReg, offset: i32, after: bool) {
    trace!("emit spill {file:?} [spill+{offset}] <- {src:?} ({})", if after { "after" } else { "before" });
    let op = if file.is_float() { synth::SPILL_STORE_F } else { synth::SPILL_STORE_I };
    let mut ins = Instruction::new(op);
    ins.sreg1 = RegSlot::from_hreg(src);
    ins.base_reg = RegSlot::from_hreg(SPILL_BASE_REG);
    ins.offset = offset;
    if after {
        list.insert_after(at, ins);
    } else {
        list.insert_before(at, ins);
    }
}

fn emit_copy(list: &mut InstrList, at: NodeId, file: RegisterFile, dst: HReg, src: HReg, after: bool) {
    trace!("emit copy {file:?} {dst:?} <- {src:?} ({})", if after { "after" } else { "before" });
    let op = if file.is_float() { synth::COPY_F } else { synth::COPY_I };
    let mut ins = Instruction::new(op);
    ins.dreg = RegSlot::from_hreg(dst);
    ins.sreg1 = RegSlot::from_hreg(src);
    if after {
        list.insert_after(at, ins);
    } else {
        list.insert_before(at, ins);
    }
}

/// Allocate hard registers for one basic block, rewriting it in place.
///
/// An empty block returns immediately (spec.md section 6). Otherwise the
/// forward liveness pass (C4) runs once, then the reverse allocator core
/// (C5) walks the recorded order back to front, consulting `isa` (C1)
/// and mutating the spill tables (C2) and register files (C3) as it
/// goes.
pub fn allocate_block(isa: &dyn InstructionSet, block: BasicBlock) -> Result<AllocatedBlock, AllocError> {
    let BasicBlock { code, max_ireg, max_freg } = block;
    if code.is_empty() {
        return Ok(AllocatedBlock {
            instructions: Vec::new(),
            frame_size: 0,
            spills_issued: 0,
        });
    }
    debug!("allocating block of {} instructions (max_ireg={max_ireg}, max_freg={max_freg})", code.len());

    let mut list = InstrList::from_instructions(code);
    let liveness = liveness::collect(&list, isa, max_ireg, max_freg)?;
    let mut ctx = AllocCtx::new(
        isa,
        max_ireg.max(isa.num_hard_iregs()),
        max_freg.max(isa.num_hard_fregs()),
    );

    let order = liveness.order.clone();
    for (pos, &node) in order.iter().enumerate().rev() {
        let i = (pos + 1) as u32;
        let opcode = list.get(node).opcode;
        debug!("reverse pass: instruction {i} ({opcode:?})");
        allocate_one(&mut ctx, &mut list, &liveness, node, i)?;
    }

    debug!(
        "block allocated: {} spill slot(s), {} byte(s) of frame growth",
        ctx.spills.total_issued(),
        ctx.spills.frame_size()
    );
    Ok(AllocatedBlock {
        frame_size: ctx.spills.frame_size(),
        spills_issued: ctx.spills.total_issued(),
        instructions: list.into_vec(),
    })
}

fn allocate_one(
    ctx: &mut AllocCtx,
    list: &mut InstrList,
    liveness: &LivenessResult,
    node: NodeId,
    i: u32,
) -> Result<(), AllocError> {
    let isa = ctx.isa;
    let inst0 = list.get(node).clone();
    let desc = *isa
        .describe(inst0.opcode)
        .ok_or_else(|| AllocError::unknown_opcode(format!("{:?}", inst0.opcode)))?;

    let dest_file = if desc.dest.is_float() { RegisterFile::Float } else { RegisterFile::Int };
    let src1_file = if desc.src1.is_float() { RegisterFile::Float } else { RegisterFile::Int };
    let src2_file = if desc.src2.is_float() { RegisterFile::Float } else { RegisterFile::Int };

    let dest_fp = desc.dest.is_float() && isa.uses_fp_stack();
    let src1_fp = desc.src1.is_float() && isa.uses_fp_stack();
    let src2_fp = desc.src2.is_float() && isa.uses_fp_stack();

    let mut dreg = inst0.dreg;
    let mut sreg1 = inst0.sreg1;
    let mut sreg2 = inst0.sreg2;
    let mut dreg_hi = inst0.dreg_hi;

    // Phase A — fixed operand hints.
    let mut dreg_mask = ctx.state(dest_file).allocatable_mask();
    let mut sreg1_mask = ctx.state(src1_file).allocatable_mask();
    let mut sreg2_mask = ctx.state(src2_file).allocatable_mask();
    let clob_fixed = desc.clob.fixed_reg();
    for f in [desc.src1_fixed, desc.src2_fixed, clob_fixed].into_iter().flatten() {
        dreg_mask &= !(1 << f.0);
    }
    for f in [desc.dest_fixed, desc.src2_fixed, clob_fixed].into_iter().flatten() {
        sreg1_mask &= !(1 << f.0);
    }
    for f in [desc.dest_fixed, desc.src1_fixed, clob_fixed].into_iter().flatten() {
        sreg2_mask &= !(1 << f.0);
    }
    sreg2_mask &= !desc.src2_forbidden_mask;

    // Phase B — FP-stack maintenance.
    if isa.uses_fp_stack() && desc.clob != ClobberClass::FpStoreToMemory {
        if dest_fp {
            if let Some(flags) = liveness.fp_flags.get(&(node, OperandRole::Dest)).copied() {
                if flags.needs_spill {
                    let slot = ctx
                        .fp_awaiting_store
                        .pop()
                        .unwrap_or_else(|| ctx.spills.alloc(RegisterFile::Float));
                    let offset = ctx.spills.offset_of(slot);
                    emit_store(list, node, RegisterFile::Float, FP_STACK_TOP, offset, false);
                }
            }
            dreg = RegSlot::from_hreg(FP_STACK_TOP);
        }
        for (role, managed, slot_mut) in [
            (OperandRole::Src1, src1_fp, &mut sreg1),
            (OperandRole::Src2, src2_fp, &mut sreg2),
        ] {
            if !managed {
                continue;
            }
            if let Some(flags) = liveness.fp_flags.get(&(node, role)).copied() {
                if flags.needs_load_spill {
                    let throwaway = ctx.spills.alloc(RegisterFile::Float);
                    let offset = ctx.spills.offset_of(throwaway);
                    emit_store(list, node, RegisterFile::Float, FP_STACK_TOP, offset, false);
                }
                if flags.needs_load || flags.needs_load_spill {
                    let slot = ctx.spills.alloc(RegisterFile::Float);
                    ctx.fp_awaiting_store.push(slot);
                    let offset = ctx.spills.offset_of(slot);
                    emit_load(list, node, RegisterFile::Float, FP_STACK_TOP, offset, false);
                }
            }
            *slot_mut = RegSlot::from_hreg(FP_STACK_TOP);
        }
    } else {
        if dest_fp {
            dreg = RegSlot::from_hreg(FP_STACK_TOP);
        }
        if src1_fp {
            sreg1 = RegSlot::from_hreg(FP_STACK_TOP);
        }
        if src2_fp {
            sreg2 = RegSlot::from_hreg(FP_STACK_TOP);
        }
    }

    // Phase C — fixed src2.
    if !src2_fp && desc.src2.is_used() {
        if let Some(r) = desc.src2_fixed {
            if sreg2.is_soft(ctx.state(src2_file).num_hard()) {
                let v = sreg2.as_vreg();
                match ctx.state(src2_file).rassign(v) {
                    Assignment::Bound(h) if h == r => {}
                    _ => {
                        if !ctx.state(src2_file).is_free(r) {
                            ctx.force_spill(list, node, src2_file, r)?;
                        } else {
                            ctx.state_mut(src2_file).alloc(1 << r.0);
                        }
                        ctx.state_mut(src2_file).assign(v, r)?;
                    }
                }
                sreg2 = RegSlot::from_hreg(r);
            } else {
                // Incoming src2 is already a (global, callee-saved) hard
                // register: force it into R with a copy rather than rebinding.
                if !ctx.state(src2_file).is_free(r) {
                    ctx.force_spill(list, node, src2_file, r)?;
                } else {
                    ctx.state_mut(src2_file).alloc(1 << r.0);
                }
                if sreg2.as_hreg() != r {
                    emit_copy(list, node, src2_file, r, sreg2.as_hreg(), false);
                }
                sreg2 = RegSlot::from_hreg(r);
            }
            dreg_mask &= !(1 << r.0);
            sreg1_mask &= !(1 << r.0);
        }
    }

    // Phase D — destination.
    let mut prev_dreg: Option<VReg> = None;
    if desc.dest.is_used() && !dest_fp && dreg.is_soft(ctx.state(dest_file).num_hard()) {
        let dv = dreg.as_vreg();
        prev_dreg = Some(dv);
        if let Some(d) = desc.dest_fixed {
            dreg_mask = 1 << d.0;
        }
        let h = match ctx.state(dest_file).rassign(dv) {
            Assignment::Bound(h) => h,
            Assignment::Unassigned => {
                let h = ctx.alloc_or_spill(list, node, dest_file, dreg_mask)?;
                ctx.state_mut(dest_file).assign(dv, h)?;
                h
            }
            Assignment::Spilled(slot) => {
                let h = ctx.alloc_or_spill(list, node, dest_file, dreg_mask)?;
                ctx.state_mut(dest_file).assign(dv, h)?;
                let offset = ctx.spills.offset_of(slot);
                emit_store(list, node, dest_file, h, offset, true);
                h
            }
        };
        dreg = RegSlot::from_hreg(h);

        let born_in = if dest_file == RegisterFile::Float {
            liveness.freg(dv).born_in
        } else {
            liveness.ireg(dv).born_in
        };
        if born_in >= i {
            ctx.state_mut(dest_file).free(h);
        }

        if let Some(d) = desc.dest_fixed {
            if h != d {
                if !ctx.state(dest_file).is_free(d) {
                    ctx.force_spill(list, node, dest_file, d)?;
                } else {
                    ctx.state_mut(dest_file).alloc(1 << d.0);
                }
                emit_copy(list, node, dest_file, d, h, true);
                dreg = RegSlot::from_hreg(d);
            }
        }
    }

    // Phase D, continued — high half of a long-pair destination. Mirrors
    // the low half exactly (same Bound/Unassigned/Spilled resolution,
    // same born_in-triggered free, same fixed-register copy-out) but
    // against vreg `lo + 1` and `dest_fixed_hi`.
    if desc.dest.is_long_pair() && !dest_fp {
        if let Some(lo_v) = prev_dreg {
            let hi_v = lo_v.pair_high();
            let mut hi_mask = ctx.state(dest_file).allocatable_mask() & !(1 << dreg.as_hreg().0);
            if let Some(d) = desc.dest_fixed_hi {
                hi_mask = 1 << d.0;
            }
            let h_hi = match ctx.state(dest_file).rassign(hi_v) {
                Assignment::Bound(h) => h,
                Assignment::Unassigned => {
                    let h = ctx.alloc_or_spill(list, node, dest_file, hi_mask)?;
                    ctx.state_mut(dest_file).assign(hi_v, h)?;
                    h
                }
                Assignment::Spilled(slot) => {
                    let h = ctx.alloc_or_spill(list, node, dest_file, hi_mask)?;
                    ctx.state_mut(dest_file).assign(hi_v, h)?;
                    let offset = ctx.spills.offset_of(slot);
                    emit_store(list, node, dest_file, h, offset, true);
                    h
                }
            };
            dreg_hi = RegSlot::from_hreg(h_hi);

            if liveness.ireg(hi_v).born_in >= i {
                ctx.state_mut(dest_file).free(h_hi);
            }

            if let Some(d) = desc.dest_fixed_hi {
                if h_hi != d {
                    if !ctx.state(dest_file).is_free(d) {
                        ctx.force_spill(list, node, dest_file, d)?;
                    } else {
                        ctx.state_mut(dest_file).alloc(1 << d.0);
                    }
                    emit_copy(list, node, dest_file, d, h_hi, true);
                    dreg_hi = RegSlot::from_hreg(d);
                }
            }
        }
    }

    // Phase E — clobbers.
    if let Some(c) = clob_fixed {
        if !ctx.state(dest_file).is_free(c) {
            ctx.force_spill(list, node, dest_file, c)?;
        }
    }
    if desc.clob.is_call() {
        let src1_v = if !src1_fp && sreg1.is_soft(ctx.state(src1_file).num_hard()) {
            Some((src1_file, sreg1.as_vreg()))
        } else {
            None
        };
        for file in [RegisterFile::Int, RegisterFile::Float] {
            if file == RegisterFile::Float && isa.uses_fp_stack() {
                continue;
            }
            let mask = ctx.state(file).allocatable_mask();
            for bit in 0..32u32 {
                if mask & (1 << bit) == 0 {
                    continue;
                }
                let h = HReg(bit as u8);
                if ctx.state(file).is_free(h) {
                    continue;
                }
                let owner = ctx.state(file).symbolic(h);
                let is_prev_dreg = prev_dreg.is_some() && owner == prev_dreg && file == dest_file;
                let is_src1 = src1_v.map_or(false, |(f, v)| f == file && owner == Some(v));
                if is_prev_dreg || is_src1 {
                    continue;
                }
                ctx.force_spill(list, node, file, h)?;
            }
        }
    }

    // Phase F — outgoing argument bindings.
    if let Some(call) = &inst0.call {
        for binding in &call.out_ireg_args {
            ctx.state_mut(RegisterFile::Int).assign(binding.vreg, binding.hreg)?;
        }
        if !isa.uses_fp_stack() {
            for binding in &call.out_freg_args {
                ctx.state_mut(RegisterFile::Float).assign(binding.vreg, binding.hreg)?;
            }
        }
    }

    // Phase G — src1, with the same-register move hint.
    if desc.src1.is_used() && !src1_fp {
        if let Some(r) = desc.src1_fixed {
            if sreg1.is_soft(ctx.state(src1_file).num_hard()) {
                // Virtual src1: resolve through the normal Bound/Unassigned/
                // Spilled machinery, just narrowed to the one fixed register.
                let v = sreg1.as_vreg();
                let h = match ctx.state(src1_file).rassign(v) {
                    Assignment::Bound(h) => h,
                    Assignment::Unassigned => {
                        if !ctx.state(src1_file).is_free(r) {
                            ctx.force_spill(list, node, src1_file, r)?;
                        } else {
                            ctx.state_mut(src1_file).alloc(1 << r.0);
                        }
                        ctx.state_mut(src1_file).assign(v, r)?;
                        r
                    }
                    Assignment::Spilled(slot) => {
                        if !ctx.state(src1_file).is_free(r) {
                            ctx.force_spill(list, node, src1_file, r)?;
                        } else {
                            ctx.state_mut(src1_file).alloc(1 << r.0);
                        }
                        ctx.state_mut(src1_file).assign(v, r)?;
                        let offset = ctx.spills.offset_of(slot);
                        emit_load(list, node, src1_file, r, offset, false);
                        r
                    }
                };
                sreg1 = RegSlot::from_hreg(h);
            } else {
                // Incoming src1 is already a (global, callee-saved) hard
                // register: force it into R with a copy rather than rebinding.
                if !ctx.state(src1_file).is_free(r) {
                    ctx.force_spill(list, node, src1_file, r)?;
                } else {
                    ctx.state_mut(src1_file).alloc(1 << r.0);
                }
                if sreg1.as_hreg() != r {
                    emit_copy(list, node, src1_file, r, sreg1.as_hreg(), false);
                }
                sreg1 = RegSlot::from_hreg(r);
            }
        } else if sreg1.is_soft(ctx.state(src1_file).num_hard()) {
            let v = sreg1.as_vreg();
            if isa.is_move(inst0.opcode)
                && matches!(ctx.state(src1_file).rassign(v), Assignment::Unassigned)
                && !dreg.is_unused()
                && dest_file == src1_file
            {
                let dh = dreg.as_hreg();
                if ctx.state(dest_file).is_free(dh) {
                    sreg1_mask = 1 << dh.0;
                }
            }
            let h = match ctx.state(src1_file).rassign(v) {
                Assignment::Bound(h) => h,
                Assignment::Unassigned => {
                    let h = ctx.alloc_or_spill(list, node, src1_file, sreg1_mask)?;
                    ctx.state_mut(src1_file).assign(v, h)?;
                    h
                }
                Assignment::Spilled(slot) => {
                    let h = ctx.alloc_or_spill(list, node, src1_file, sreg1_mask)?;
                    ctx.state_mut(src1_file).assign(v, h)?;
                    let offset = ctx.spills.offset_of(slot);
                    emit_load(list, node, src1_file, h, offset, false);
                    h
                }
            };
            sreg1 = RegSlot::from_hreg(h);
        }
        if !sreg1.is_unused() {
            sreg2_mask &= !(1 << sreg1.as_hreg().0);
        }
    }

    // Phase H — src1-clobbering destinations.
    let same_as_src1 = desc.clob == ClobberClass::SameAsSrc1
        || (desc.dest.is_float() && desc.src1.is_float() && !isa.uses_fp_stack());
    if same_as_src1 && !dest_fp && desc.dest.is_used() && desc.src1.is_used() && dreg != sreg1 {
        if desc.src2.is_used() && sreg2 == dreg {
            let r2 = ctx.alloc_or_spill(list, node, dest_file, dreg_mask)?;
            emit_copy(list, node, dest_file, r2, sreg2.as_hreg(), false);
            ctx.state_mut(dest_file).free(r2);
            sreg2 = RegSlot::from_hreg(r2);
        }
        emit_copy(list, node, dest_file, dreg.as_hreg(), sreg1.as_hreg(), false);
        sreg1 = dreg;
        sreg2_mask &= !(1 << sreg1.as_hreg().0);
        sreg2_mask &= !(1 << dreg.as_hreg().0);
    }

    // Phase I — src2, symmetric to G without the move hint.
    if desc.src2.is_used() && !src2_fp && sreg2.is_soft(ctx.state(src2_file).num_hard()) {
        let v = sreg2.as_vreg();
        let h = match ctx.state(src2_file).rassign(v) {
            Assignment::Bound(h) => h,
            Assignment::Unassigned => {
                let h = ctx.alloc_or_spill(list, node, src2_file, sreg2_mask)?;
                ctx.state_mut(src2_file).assign(v, h)?;
                h
            }
            Assignment::Spilled(slot) => {
                let h = ctx.alloc_or_spill(list, node, src2_file, sreg2_mask)?;
                ctx.state_mut(src2_file).assign(v, h)?;
                let offset = ctx.spills.offset_of(slot);
                emit_load(list, node, src2_file, h, offset, false);
                h
            }
        };
        sreg2 = RegSlot::from_hreg(h);
    }

    let final_inst = list.get_mut(node);
    final_inst.dreg = dreg;
    final_inst.sreg1 = sreg1;
    final_inst.sreg2 = sreg2;
    final_inst.dreg_hi = dreg_hi;

    Ok(())
}

#[cfg(test)]
#[path = "alloc/scenario_tests.rs"]
mod scenario_tests;
