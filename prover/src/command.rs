//! `berry-prover` subcommand handlers.

use anyhow::{ensure, Context, Result};
use berry_prover::{MerkleTree, StepProof};
use berry_vm::{init_logger, trace::hashing::keccak, RunArgs, Trace, TraceRecorder};
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, ProgramArgs, ProveCmd, RunCmd, Subcommand};

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logger();

    match cli.subcommand {
        Subcommand::Run(cmd) => run_program(cmd),
        Subcommand::Prove(cmd) => prove_step(cmd),
    }
}

fn record(program: &ProgramArgs) -> (Trace, TraceRecorder) {
    let args = RunArgs::new(program.code.0.clone())
        .with_call_data(program.call_data.0.clone())
        .with_step_count(program.steps);
    let mut recorder = TraceRecorder::default();
    let trace = recorder.run(args);
    (trace, recorder)
}

fn run_program(cmd: RunCmd) -> Result<()> {
    let (trace, recorder) = record(&cmd.program);
    let (errno, pc, return_value) = (trace.errno(), trace.state.pc, trace.return_value().to_vec());
    let tree = MerkleTree::from_trace(trace).context("committing to the trace")?;

    let proof = tree.compute_result_proof();
    let verified =
        MerkleTree::verify_result_proof(&proof, &keccak(&return_value), &tree.root_hash());
    info!(steps = tree.steps().len(), verified, "result proof computed");

    println!("errno:        {errno:#04x}");
    println!("pc:           {pc}");
    println!("return value: 0x{}", hex::encode(&return_value));
    println!("steps:        {}", tree.steps().len());
    println!("depth:        {}", tree.depth());
    println!("root:         {:?}", tree.root_hash());
    println!("result proof:");
    for pair in proof.chunks_exact(2) {
        println!("  {:?} {:?}", pair[0], pair[1]);
    }

    if cmd.print_tree {
        print!("{tree}");
    }
    if cmd.stats {
        print!("{}", recorder.stats());
    }
    Ok(())
}

fn prove_step(cmd: ProveCmd) -> Result<()> {
    let (trace, _) = record(&cmd.program);
    let tree = MerkleTree::from_trace(trace).context("committing to the trace")?;
    ensure!(
        cmd.step < tree.steps().len(),
        "step {} out of range, the run has {} steps",
        cmd.step,
        tree.steps().len()
    );

    let proof: StepProof = tree.construct_proof(cmd.step)?;
    let step = &tree.steps()[cmd.step];
    info!(step = cmd.step, opcode = step.opname, "single-step proof built");

    println!("0x{}", hex::encode(proof.encode(&cmd.dispute_id)));
    Ok(())
}
