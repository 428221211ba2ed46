use std::sync::Arc;

use ethereum_types::H256;
use smallvec::SmallVec;

use super::hashing::{EMPTY_HASH, ZERO_HASH};
use crate::memory::ByteRange;

/// Snapshot recorded after one executed instruction.
///
/// Holds exactly what is needed to hash the machine state after the step
/// and to replay the step in isolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionStep {
    /// Mnemonic of the executed instruction.
    pub opname: &'static str,
    /// Next instruction, or the executing one when the step halted or failed.
    pub pc: usize,
    pub errno: u8,
    pub return_data: Vec<u8>,

    /// Stack entries the instruction consumed, deepest first.
    pub compact_stack: SmallVec<[H256; 4]>,
    /// Entries the instruction left on top of the untouched stack.
    pub pushed: SmallVec<[H256; 4]>,
    /// Stack hash chain value below the consumed entries.
    pub compact_stack_hash: H256,
    pub stack_hash: H256,
    pub stack_size: usize,

    /// Memory image after the step, shared with previous steps when the
    /// memory did not change.
    pub mem: Arc<[u8]>,
    /// Size in 32-byte words.
    pub mem_size: usize,
    pub mem_hash: H256,
    pub mem_read: Option<ByteRange>,
    pub mem_write: Option<ByteRange>,
    pub call_data_read: Option<ByteRange>,
}

impl ExecutionStep {
    /// The state before the first instruction of a fresh run.
    pub fn initial() -> Self {
        Self {
            opname: "",
            pc: 0,
            errno: 0,
            return_data: Vec::new(),
            compact_stack: SmallVec::new(),
            pushed: SmallVec::new(),
            compact_stack_hash: ZERO_HASH,
            stack_hash: ZERO_HASH,
            stack_size: 0,
            mem: Arc::from(Vec::new()),
            mem_size: 0,
            mem_hash: *EMPTY_HASH,
            mem_read: None,
            mem_write: None,
            call_data_read: None,
        }
    }

    /// The step read or wrote memory, so replaying it needs the memory image.
    pub fn is_memory_required(&self) -> bool {
        self.mem_read.is_some() || self.mem_write.is_some()
    }

    /// The step read calldata, so replaying it needs the full calldata.
    pub fn is_call_data_required(&self) -> bool {
        self.call_data_read.is_some()
    }
}
