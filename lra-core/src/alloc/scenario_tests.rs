//! End-to-end scenarios over [`DemoIsa`], one per named situation the
//! phase ordering in `allocate_block` has to get right: the move hint,
//! spilling under register pressure, a fixed destination (free and
//! contested), a shift's fixed/forbidden src2, a call's outgoing ABI
//! bindings plus a value kept live across it, and a long-pair result.
//!
//! These inputs are built by hand, not generated, so every assertion
//! below is something this module's author worked out by tracing the
//! phases against this exact register count and mask, not a property
//! that happens to fall out of whatever the allocator currently does.

use pretty_assertions::assert_eq;

use lra_common::{HReg, VReg};
use lra_isa::demo::{op, DemoIsa, EAX, ECX, EDX};
use lra_isa::inst::synth;
use lra_isa::{CallInfo, ArgBinding, Instruction, InstructionSet, RegSlot};

use crate::{allocate_block, BasicBlock};

fn check_range(slot: RegSlot, num_hard: u32, what: &str) {
    if !slot.is_unused() {
        assert!(
            slot.0 >= 0 && (slot.0 as u32) < num_hard,
            "{what} = {slot:?} is not a legal hard register (0..{num_hard})"
        );
    }
}

/// Invariant 1 — operand validity. Every used slot of every output
/// instruction names a legal hard register for its file.
fn assert_operand_validity(instructions: &[Instruction], isa: &DemoIsa) {
    let num_i = isa.num_hard_iregs();
    let num_f = isa.num_hard_fregs();
    for inst in instructions {
        match inst.opcode {
            synth::COPY_I | synth::SPILL_STORE_I | synth::SPILL_LOAD_I => {
                check_range(inst.dreg, num_i, "dreg");
                check_range(inst.sreg1, num_i, "sreg1");
            }
            synth::COPY_F | synth::SPILL_STORE_F | synth::SPILL_LOAD_F => {
                check_range(inst.dreg, num_f, "dreg");
                check_range(inst.sreg1, num_f, "sreg1");
            }
            opcode => {
                let desc = isa.describe(opcode).expect("every real opcode is described");
                let dest_n = if desc.dest.is_float() { num_f } else { num_i };
                let src1_n = if desc.src1.is_float() { num_f } else { num_i };
                let src2_n = if desc.src2.is_float() { num_f } else { num_i };
                if desc.dest.is_used() {
                    check_range(inst.dreg, dest_n, "dreg");
                    if desc.dest.is_long_pair() {
                        check_range(inst.dreg_hi, dest_n, "dreg_hi");
                    }
                }
                if desc.src1.is_used() {
                    check_range(inst.sreg1, src1_n, "sreg1");
                }
                if desc.src2.is_used() {
                    check_range(inst.sreg2, src2_n, "sreg2");
                }
            }
        }
    }
}

fn count_opcode(instructions: &[Instruction], opcode: lra_isa::OpCode) -> usize {
    instructions.iter().filter(|i| i.opcode == opcode).count()
}

// S1 — trivial move.
#[test]
fn s1_trivial_move_takes_the_same_register_hint() {
    let isa = DemoIsa::flat();
    let block = BasicBlock::new(
        vec![Instruction::new(op::MOVE).with_dreg(VReg(4)).with_sreg1(VReg(5))],
        6,
        0,
    );
    let result = allocate_block(&isa, block).unwrap();
    assert_operand_validity(&result.instructions, &isa);
    assert_eq!(result.instructions.len(), 1);
    let mv = &result.instructions[0];
    assert_eq!(mv.dreg, mv.sreg1, "move hint should land src1 in dest's register");
    assert_eq!(result.spills_issued, 0);
    assert_eq!(result.frame_size, 0);
}

// S2 — spill under pressure. Five fresh integer values (each itself
// sourced from a distinct live-in) are all still live by the end of
// their five defining moves, competing for four hard registers; a
// reduction chain then consumes them pairwise. This ISA's operands cap
// at two sources, so the literal "one instruction reads all five"
// input from the property text isn't expressible verbatim — this is
// the closest equivalent: the same five-values/four-registers peak,
// reached across several two-operand instructions instead of one.
//
// With no priority/distance-to-next-use heuristic (by design, see
// spec's get_register_spilling note), eviction cascades past the one
// "excess" value and also displaces the chain's own live-in sources as
// they're bound going further back, so more than one slot is typically
// issued. The exact count is an artifact of the lowest-bit eviction
// order rather than a property of the input, so only the structural
// invariants that must hold regardless of that count are asserted.
#[test]
fn s2_register_pressure_forces_at_least_one_spill() {
    let isa = DemoIsa::flat();
    let code = vec![
        Instruction::new(op::MOVE).with_dreg(VReg(4)).with_sreg1(VReg(20)),
        Instruction::new(op::MOVE).with_dreg(VReg(5)).with_sreg1(VReg(21)),
        Instruction::new(op::MOVE).with_dreg(VReg(6)).with_sreg1(VReg(22)),
        Instruction::new(op::MOVE).with_dreg(VReg(7)).with_sreg1(VReg(23)),
        Instruction::new(op::MOVE).with_dreg(VReg(8)).with_sreg1(VReg(24)),
        Instruction::new(op::ADD).with_dreg(VReg(9)).with_sreg1(VReg(4)).with_sreg2(VReg(5)),
        Instruction::new(op::ADD).with_dreg(VReg(10)).with_sreg1(VReg(6)).with_sreg2(VReg(7)),
        Instruction::new(op::ADD).with_dreg(VReg(11)).with_sreg1(VReg(9)).with_sreg2(VReg(10)),
        Instruction::new(op::ADD).with_dreg(VReg(12)).with_sreg1(VReg(11)).with_sreg2(VReg(8)),
    ];
    let block = BasicBlock::new(code, 25, 0);
    let result = allocate_block(&isa, block).unwrap();
    assert_operand_validity(&result.instructions, &isa);

    let stores = count_opcode(&result.instructions, synth::SPILL_STORE_I);
    let loads = count_opcode(&result.instructions, synth::SPILL_LOAD_I);

    assert!(result.spills_issued >= 1, "five live values in four registers must spill");
    assert_eq!(result.frame_size, result.spills_issued as i32 * 8);
    // Every force-spill allocates exactly one slot and emits exactly one
    // reload; this holds regardless of which vreg got evicted.
    assert_eq!(loads, result.spills_issued);
    // A store only appears for a vreg whose own definition the pass still
    // visits; an evicted value with no local def (a block live-in) never
    // gets one, so this can be strict.
    assert!(stores <= loads);
}

// S3 — fixed destination, register free.
#[test]
fn s3_fixed_destination_binds_directly_when_free() {
    let isa = DemoIsa::flat();
    let block = BasicBlock::new(
        vec![Instruction::new(op::SUB).with_dreg(VReg(6)).with_sreg1(VReg(7)).with_sreg2(VReg(8))],
        9,
        0,
    );
    let result = allocate_block(&isa, block).unwrap();
    assert_operand_validity(&result.instructions, &isa);
    assert_eq!(result.instructions[0].dreg, RegSlot::from_hreg(HReg(1)));
    assert_eq!(result.spills_issued, 0);
}

// S3 — fixed destination, register held by another live vreg.
#[test]
fn s3_fixed_destination_force_spills_the_occupant() {
    let isa = DemoIsa::flat();
    let mut call = CallInfo::default();
    call.out_ireg_args.push(ArgBinding { vreg: VReg(9), hreg: HReg(1) });
    let code = vec![
        Instruction::new(op::SUB).with_dreg(VReg(6)).with_sreg1(VReg(7)).with_sreg2(VReg(8)),
        Instruction::new(op::CALL).with_call(call),
    ];
    let block = BasicBlock::new(code, 10, 0);
    let result = allocate_block(&isa, block).unwrap();
    assert_operand_validity(&result.instructions, &isa);

    assert_eq!(result.instructions[0].opcode, op::SUB);
    assert_eq!(result.instructions[0].dreg, RegSlot::from_hreg(HReg(1)));
    assert_eq!(result.spills_issued, 1);

    let call_pos = result
        .instructions
        .iter()
        .position(|i| i.opcode == op::CALL)
        .expect("call survives allocation");
    assert_eq!(
        result.instructions[call_pos - 1].opcode,
        synth::SPILL_LOAD_I,
        "the vreg bumped out of R1 reloads immediately after the SUB that evicted it"
    );
}

// S4 — shift: src2 pinned to ECX, src1 forbidden there.
#[test]
fn s4_shift_pins_src2_to_ecx_and_keeps_src1_off_it() {
    let isa = DemoIsa::flat();
    let block = BasicBlock::new(
        vec![Instruction::new(op::SHL).with_dreg(VReg(6)).with_sreg1(VReg(7)).with_sreg2(VReg(8))],
        9,
        0,
    );
    let result = allocate_block(&isa, block).unwrap();
    assert_operand_validity(&result.instructions, &isa);
    let shl = &result.instructions[0];
    assert_eq!(shl.sreg2, RegSlot::from_hreg(ECX));
    assert_ne!(shl.sreg1, RegSlot::from_hreg(ECX));
}

// S4, variant — shift whose src2 arrives pre-bound to a callee-saved
// ("global") hard register rather than a virtual one. Phase C must copy
// it into the fixed register rather than leaving it untouched: fixed-
// register honour (invariant 5) has to hold for global operands too,
// not only virtual ones.
#[test]
fn s4_shift_copies_a_global_src2_into_its_fixed_register() {
    let isa = DemoIsa::flat_with_global();
    let mut shl = Instruction::new(op::SHL).with_dreg(VReg(6)).with_sreg1(VReg(7));
    shl.sreg2 = RegSlot::from_hreg(EDX);
    let block = BasicBlock::new(vec![shl], 8, 0);
    let result = allocate_block(&isa, block).unwrap();
    assert_operand_validity(&result.instructions, &isa);

    let shl_pos = result
        .instructions
        .iter()
        .position(|i| i.opcode == op::SHL)
        .expect("shift survives allocation");
    assert!(shl_pos >= 1, "a copy into ECX must precede the shift");
    let copy = &result.instructions[shl_pos - 1];
    assert_eq!(copy.opcode, synth::COPY_I);
    assert_eq!(copy.dreg, RegSlot::from_hreg(ECX));
    assert_eq!(copy.sreg1, RegSlot::from_hreg(EDX));

    let shl = &result.instructions[shl_pos];
    assert_eq!(shl.sreg2, RegSlot::from_hreg(ECX));
    assert_ne!(shl.sreg1, RegSlot::from_hreg(ECX));
}

// S5 — call: outgoing bindings land before the call, a value live
// across it is spilled before and reloaded after.
#[test]
fn s5_call_spills_a_value_live_across_it() {
    let isa = DemoIsa::flat();
    let mut call = CallInfo::default();
    call.out_ireg_args.push(ArgBinding { vreg: VReg(10), hreg: HReg(0) });
    call.out_ireg_args.push(ArgBinding { vreg: VReg(11), hreg: HReg(1) });
    let code = vec![
        Instruction::new(op::MOVE).with_dreg(VReg(12)).with_sreg1(VReg(13)),
        Instruction::new(op::CALL).with_call(call),
        Instruction::new(op::MOVE).with_dreg(VReg(14)).with_sreg1(VReg(12)),
    ];
    let block = BasicBlock::new(code, 15, 0);
    let result = allocate_block(&isa, block).unwrap();
    assert_operand_validity(&result.instructions, &isa);

    assert_eq!(result.spills_issued, 1);
    assert_eq!(result.frame_size, 8);

    let call_pos = result
        .instructions
        .iter()
        .position(|i| i.opcode == op::CALL)
        .expect("call survives allocation");
    assert_eq!(result.instructions[call_pos - 1].opcode, synth::SPILL_STORE_I);
    assert_eq!(result.instructions[call_pos + 1].opcode, synth::SPILL_LOAD_I);

    let call_inst = &result.instructions[call_pos];
    let call_info = call_inst.call.as_ref().expect("call info preserved");
    assert_eq!(call_info.out_ireg_args[0], ArgBinding { vreg: VReg(10), hreg: HReg(0) });
    assert_eq!(call_info.out_ireg_args[1], ArgBinding { vreg: VReg(11), hreg: HReg(1) });
}

// FP-stack depth, invariant 8: under register pressure on a
// depth-limited FP file, the rewritten stream never needs more than
// `fp_stack_size()` live FP values at once — excess defs spill to
// memory and reload, the same way integer register pressure does in
// S2, and every float operand slot collapses to the stack-top
// sentinel rather than a real register id.
#[test]
fn fp_stack_depth_spills_under_pressure() {
    let isa = DemoIsa::fp_stack();
    let code = vec![
        Instruction::new(op::FLOAD).with_dreg(VReg(4)),
        Instruction::new(op::FLOAD).with_dreg(VReg(5)),
        Instruction::new(op::FLOAD).with_dreg(VReg(6)),
        Instruction::new(op::FLOAD).with_dreg(VReg(7)),
        Instruction::new(op::FLOAD).with_dreg(VReg(8)),
        Instruction::new(op::FADD).with_dreg(VReg(9)).with_sreg1(VReg(4)).with_sreg2(VReg(5)),
        Instruction::new(op::FADD).with_dreg(VReg(10)).with_sreg1(VReg(6)).with_sreg2(VReg(7)),
        Instruction::new(op::FADD).with_dreg(VReg(11)).with_sreg1(VReg(9)).with_sreg2(VReg(10)),
        Instruction::new(op::FADD).with_dreg(VReg(12)).with_sreg1(VReg(11)).with_sreg2(VReg(8)),
    ];
    let block = BasicBlock::new(code, 0, 13);
    let result = allocate_block(&isa, block).unwrap();
    assert_operand_validity(&result.instructions, &isa);

    for inst in &result.instructions {
        if let Some(desc) = isa.describe(inst.opcode) {
            if desc.dest.is_used() && desc.dest.is_float() {
                assert_eq!(inst.dreg, RegSlot::from_hreg(super::FP_STACK_TOP));
            }
            if desc.src1.is_used() && desc.src1.is_float() {
                assert_eq!(inst.sreg1, RegSlot::from_hreg(super::FP_STACK_TOP));
            }
            if desc.src2.is_used() && desc.src2.is_float() {
                assert_eq!(inst.sreg2, RegSlot::from_hreg(super::FP_STACK_TOP));
            }
        }
    }

    let stores = count_opcode(&result.instructions, synth::SPILL_STORE_F);
    let loads = count_opcode(&result.instructions, synth::SPILL_LOAD_F);
    assert!(stores >= 1, "five defs against a depth-4 stack must spill at least one");
    assert!(loads >= 1, "every FP spill this block issues is eventually reloaded");
    assert_eq!(result.frame_size, result.spills_issued as i32 * 8);
}

// S6 — long pair: a LongLo destination binds to EAX, its mirrored
// high half (v + 1) binds to EDX, both born at the same instruction.
#[test]
fn s6_long_pair_binds_eax_edx() {
    let isa = DemoIsa::flat();
    let block = BasicBlock::new(
        vec![Instruction::new(op::MUL_LONG)
            .with_dreg(VReg(10))
            .with_sreg1(VReg(7))
            .with_sreg2(VReg(8))],
        12,
        0,
    );
    let result = allocate_block(&isa, block).unwrap();
    assert_operand_validity(&result.instructions, &isa);
    let mul = &result.instructions[0];
    assert_eq!(mul.dreg, RegSlot::from_hreg(EAX));
    assert_eq!(mul.dreg_hi, RegSlot::from_hreg(EDX));
}
