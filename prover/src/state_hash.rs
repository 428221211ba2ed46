//! Per-step state commitments.
//!
//! A state hash splits into the pre-state hash, which a single-step proof
//! re-derives on chain, and the commitment to the step's return data.

use berry_vm::{
    trace::hashing::{keccak, keccak_pair, word_to_h256},
    ExecutionStep, Word,
};
use ethereum_types::H256;

/// `keccak(stackHash ‖ memHash ‖ callDataHash ‖ pc ‖ stackSize ‖ memSize)`,
/// integers encoded as 32-byte big-endian words.
pub fn pre_state_hash(step: &ExecutionStep, call_data_hash: &H256) -> H256 {
    let mut buf = Vec::with_capacity(6 * 32);
    buf.extend_from_slice(step.stack_hash.as_bytes());
    buf.extend_from_slice(step.mem_hash.as_bytes());
    buf.extend_from_slice(call_data_hash.as_bytes());
    for value in [step.pc, step.stack_size, step.mem_size] {
        buf.extend_from_slice(word_to_h256(Word::from(value)).as_bytes());
    }
    keccak(&buf)
}

pub fn state_hash(step: &ExecutionStep, call_data_hash: &H256) -> H256 {
    keccak_pair(
        &pre_state_hash(step, call_data_hash),
        &keccak(&step.return_data),
    )
}

/// State hash of a fresh run: empty stack and memory, pc 0, no return data.
pub fn initial_state_hash(call_data_hash: &H256) -> H256 {
    state_hash(&ExecutionStep::initial(), call_data_hash)
}
