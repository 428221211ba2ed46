use std::sync::Arc;

use berry_vm::{
    trace::hashing::{keccak, stack_hash, word_to_h256, EMPTY_HASH, ZERO_HASH},
    ByteRange, RunArgs, TraceRecorder, VmError, Word,
};

fn record(code: Vec<u8>) -> berry_vm::Trace {
    TraceRecorder::default().run(RunArgs::new(code))
}

#[test]
fn test_one_step_per_instruction() {
    let trace = record(vec![0x60, 0x03, 0x60, 0x05, 0x01]);
    let names: Vec<_> = trace.steps.iter().map(|step| step.opname).collect();
    assert_eq!(names, ["PUSH1", "PUSH1", "ADD"]);
    assert_eq!(trace.steps[2].pc, 5);
    assert_eq!(trace.errno(), 0);

    let add = &trace.steps[2];
    assert_eq!(add.stack_size, 1);
    assert_eq!(
        add.compact_stack.as_slice(),
        &[word_to_h256(Word::from(3)), word_to_h256(Word::from(5))]
    );
    assert_eq!(add.compact_stack_hash, ZERO_HASH);
    assert_eq!(
        add.stack_hash,
        stack_hash(&[word_to_h256(Word::from(8))], ZERO_HASH)
    );
}

#[test]
fn test_stack_hash_matches_full_recomputation() {
    // PUSH1 1, PUSH1 2, PUSH1 3, DUP2, SWAP3, POP, ADD
    let trace = record(vec![0x60, 0x01, 0x60, 0x02, 0x60, 0x03, 0x81, 0x92, 0x50, 0x01]);
    assert_eq!(trace.errno(), 0);

    let last = trace.steps.last().unwrap();
    let expected: Vec<_> = trace
        .state
        .stack
        .iter()
        .copied()
        .map(word_to_h256)
        .collect();
    assert_eq!(last.stack_hash, stack_hash(&expected, ZERO_HASH));
    assert_eq!(last.stack_size, trace.state.stack.len());
}

#[test]
fn test_memory_image_reused_until_written() {
    // PUSH1 0x2a, PUSH1 0, MSTORE, PUSH1 1, POP, PUSH1 0, MLOAD
    let trace = record(vec![
        0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x01, 0x50, 0x60, 0x00, 0x51,
    ]);
    let steps = &trace.steps;
    assert_eq!(steps[0].mem_hash, *EMPTY_HASH);

    let mstore = &steps[2];
    assert_eq!(mstore.mem_write, Some(ByteRange { start: 0, end: 32 }));
    assert_eq!(mstore.mem_size, 1);
    assert_eq!(mstore.mem_hash, keccak(&mstore.mem));
    assert!(mstore.is_memory_required());

    let pop = &steps[4];
    assert!(!pop.is_memory_required());
    assert!(Arc::ptr_eq(&pop.mem, &mstore.mem));
    assert_eq!(pop.mem_hash, mstore.mem_hash);

    let mload = &steps[6];
    assert_eq!(mload.mem_read, Some(ByteRange { start: 0, end: 32 }));
    assert_eq!(mload.mem_write, None);
    assert!(Arc::ptr_eq(&mload.mem, &mstore.mem));
}

#[test]
fn test_call_data_read_ranges() {
    // PUSH1 2, CALLDATALOAD, CALLDATASIZE, PUSH1 0
    let trace = TraceRecorder::default().run(
        RunArgs::new(vec![0x60, 0x02, 0x35, 0x36, 0x60, 0x00]).with_call_data(vec![0u8; 8]),
    );
    let steps = &trace.steps;
    assert_eq!(steps[1].call_data_read, Some(ByteRange { start: 2, end: 8 }));
    assert!(steps[1].is_call_data_required());
    assert_eq!(steps[2].call_data_read, Some(ByteRange { start: 0, end: 8 }));
    assert_eq!(steps[3].call_data_read, None);
}

#[test]
fn test_failing_step_is_recorded() {
    // PUSH1 1, ADD
    let trace = record(vec![0x60, 0x01, 0x01]);
    assert_eq!(trace.steps.len(), 2);
    let failed = &trace.steps[1];
    assert_eq!(failed.errno, VmError::StackUnderflow.errno());
    assert_eq!(failed.pc, 2);
    assert_eq!(failed.stack_size, 1);
    assert_eq!(failed.stack_hash, trace.steps[0].stack_hash);
}

#[test]
fn test_step_count_and_return_data() {
    // PUSH1 0xaa, PUSH1 0, MSTORE8, PUSH1 1, PUSH1 0, RETURN
    let code = vec![0x60, 0xaa, 0x60, 0x00, 0x53, 0x60, 0x01, 0x60, 0x00, 0xf3];

    let limited = TraceRecorder::default().run(RunArgs::new(code.clone()).with_step_count(2));
    assert_eq!(limited.steps.len(), 2);
    assert!(limited.state.is_running());

    let full = record(code);
    let last = full.steps.last().unwrap();
    assert_eq!(last.opname, "RETURN");
    assert_eq!(last.return_data, vec![0xaa]);
    assert_eq!(full.return_value(), &[0xaa]);
    assert!(full.state.stopped);
}

#[test]
fn test_recorder_counts_steps() {
    let mut recorder = TraceRecorder::default();
    recorder.run(RunArgs::new(vec![0x60, 0x01, 0x60, 0x02, 0x01]));
    assert_eq!(recorder.stats().total_steps(), 3);
    assert_eq!(recorder.stats().failed_steps(), 0);
}
