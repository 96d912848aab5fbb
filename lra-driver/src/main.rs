//! Local register allocator — debugging CLI driver.
//!
//! Loads a basic block described as JSON, runs it through
//! `lra_core::allocate_block` against a selectable [`InstructionSet`],
//! and prints the rewritten instruction stream plus spill statistics.
//! This is a debugging aid, not a production interface — the real entry
//! point is `lra_core::allocate_block` itself.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lra_common::{HReg, VReg};
use lra_core::{allocate_block, BasicBlock};
use lra_isa::demo::{op, DemoIsa};
use lra_isa::{ArgBinding, CallInfo, Instruction, OpCode};
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "lra")]
#[command(about = "Local register allocator driver")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate a block described as JSON and print the result.
    Allocate {
        /// Path to a JSON block description (see `InputBlock`'s fields).
        input: PathBuf,

        /// Which instruction set to allocate against.
        #[arg(long, default_value = "demo")]
        isa: String,

        /// Use the FP-stack shaped demo ISA instead of the flat one.
        #[arg(long)]
        fp_stack: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_module_path(true)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Allocate { input, isa, fp_stack } => {
            if let Err(e) = run_allocate(&input, &isa, fp_stack) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn run_allocate(
    input: &std::path::Path,
    isa_name: &str,
    fp_stack: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let isa: DemoIsa = match isa_name {
        "demo" => {
            if fp_stack {
                DemoIsa::fp_stack()
            } else {
                DemoIsa::flat()
            }
        }
        other => return Err(format!("unknown instruction set '{other}' (known: demo)").into()),
    };

    let text = fs::read_to_string(input)?;
    let dto: InputBlock = serde_json::from_str(&text)?;
    let block = dto.into_basic_block()?;

    let result = allocate_block(&isa, block).unwrap_or_else(|e| panic!("allocation failed: {e}"));

    println!(
        "{} instructions, {} spills issued, {} bytes of frame",
        result.instructions.len(),
        result.spills_issued,
        result.frame_size
    );
    for inst in &result.instructions {
        println!("{inst:?}");
    }
    Ok(())
}

/// JSON shape of one instruction in an input block. Register fields name
/// virtual register ids; `lra-core` assigns hard registers for them.
/// `out_ireg_args`/`out_freg_args` entries are `(vreg, hreg)` pairs and
/// are only meaningful on a `CALL`-like opcode.
#[derive(Deserialize)]
struct InputInstr {
    op: String,
    #[serde(default)]
    dreg: Option<u16>,
    #[serde(default)]
    sreg1: Option<u16>,
    #[serde(default)]
    sreg2: Option<u16>,
    #[serde(default)]
    out_ireg_args: Vec<(u16, u8)>,
    #[serde(default)]
    out_freg_args: Vec<(u16, u8)>,
}

/// JSON shape of an input block: the instruction stream plus the
/// per-file virtual register count bound `BasicBlock` needs.
#[derive(Deserialize)]
struct InputBlock {
    max_ireg: u32,
    max_freg: u32,
    instructions: Vec<InputInstr>,
}

impl InputBlock {
    fn into_basic_block(self) -> Result<BasicBlock, Box<dyn std::error::Error>> {
        let mut code = Vec::with_capacity(self.instructions.len());
        for i in self.instructions {
            let opcode = opcode_by_name(&i.op)?;
            let mut inst = Instruction::new(opcode);
            if let Some(v) = i.dreg {
                inst = inst.with_dreg(VReg(v));
            }
            if let Some(v) = i.sreg1 {
                inst = inst.with_sreg1(VReg(v));
            }
            if let Some(v) = i.sreg2 {
                inst = inst.with_sreg2(VReg(v));
            }
            if !i.out_ireg_args.is_empty() || !i.out_freg_args.is_empty() {
                let call = CallInfo {
                    out_ireg_args: i
                        .out_ireg_args
                        .into_iter()
                        .map(|(v, h)| ArgBinding { vreg: VReg(v), hreg: HReg(h) })
                        .collect(),
                    out_freg_args: i
                        .out_freg_args
                        .into_iter()
                        .map(|(v, h)| ArgBinding { vreg: VReg(v), hreg: HReg(h) })
                        .collect(),
                };
                inst = inst.with_call(call);
            }
            code.push(inst);
        }
        Ok(BasicBlock::new(code, self.max_ireg, self.max_freg))
    }
}

fn opcode_by_name(name: &str) -> Result<OpCode, Box<dyn std::error::Error>> {
    Ok(match name {
        "MOVE" => op::MOVE,
        "ADD" => op::ADD,
        "SUB" => op::SUB,
        "CALL" => op::CALL,
        "SHL" => op::SHL,
        "MUL_LONG" => op::MUL_LONG,
        "FMOVE" => op::FMOVE,
        "FADD" => op::FADD,
        "FSTORE_MEM" => op::FSTORE_MEM,
        "FLOAD" => op::FLOAD,
        other => return Err(format!("unknown opcode '{other}'").into()),
    })
}
