use ahash::AHashSet;
use ethereum_types::{H160, H256};
use serde::{Deserialize, Serialize};

use super::VmError;
use crate::{
    integer_ops::Word,
    memory::{CallData, Memory},
    opcodes::Opcode,
};

/// Maximum number of words the stack may hold after any step.
pub const STACK_LIMIT: usize = 1024;

/// Event emitted by `LOG0`..`LOG4` or returned by a host call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub address: H160,
    pub topics: Vec<H256>,
    pub data: Vec<u8>,
}

/// Inputs of a run.
///
/// `stack`, `memory` and `pc` are only set when resuming from a snapshot.
/// A missing caller falls back to the origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    pub code: Vec<u8>,
    pub call_data: Vec<u8>,
    pub caller: Option<H160>,
    pub origin: H160,
    pub address: H160,
    pub stack: Vec<Word>,
    pub memory: Vec<u8>,
    pub pc: usize,
    /// Maximum number of steps to execute; zero means unbounded.
    pub step_count: usize,
    pub is_static: bool,
}

impl RunArgs {
    pub fn new(code: impl Into<Vec<u8>>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn with_call_data(mut self, call_data: impl Into<Vec<u8>>) -> Self {
        self.call_data = call_data.into();
        self
    }

    pub fn with_caller(mut self, caller: H160) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_origin(mut self, origin: H160) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_address(mut self, address: H160) -> Self {
        self.address = address;
        self
    }

    pub fn with_stack(mut self, stack: Vec<Word>) -> Self {
        self.stack = stack;
        self
    }

    pub fn with_memory(mut self, memory: Vec<u8>) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_pc(mut self, pc: usize) -> Self {
        self.pc = pc;
        self
    }

    pub fn with_step_count(mut self, step_count: usize) -> Self {
        self.step_count = step_count;
        self
    }

    pub fn static_call(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Mutable machine state of a single run.
#[derive(Debug, Clone)]
pub struct RunState {
    pub code: Vec<u8>,
    pub call_data: CallData,
    pub caller: H160,
    pub origin: H160,
    pub address: H160,
    pub stack: Vec<Word>,
    pub memory: Memory,
    pub pc: usize,
    pub stopped: bool,
    pub error: Option<VmError>,
    pub return_value: Vec<u8>,
    pub valid_jumps: AHashSet<usize>,
    pub logs: Vec<LogEntry>,
    /// Opcode of the most recently executed step.
    pub opcode: Opcode,
    pub is_static: bool,
}

impl RunState {
    /// Builds the state for a run, registering every `JUMPDEST` that is not
    /// part of a `PUSH` immediate.
    pub fn new(args: RunArgs) -> Self {
        let valid_jumps = scan_jump_destinations(&args.code);
        Self {
            caller: args.caller.unwrap_or(args.origin),
            origin: args.origin,
            address: args.address,
            call_data: CallData::new(args.call_data),
            stack: args.stack,
            memory: Memory::from_bytes(args.memory),
            pc: args.pc,
            stopped: false,
            error: None,
            return_value: Vec::new(),
            valid_jumps,
            logs: Vec::new(),
            opcode: Opcode::Stop,
            is_static: args.is_static,
            code: args.code,
        }
    }

    /// Error number of the last step, zero on success.
    pub fn errno(&self) -> u8 {
        self.error.map_or(0, VmError::errno)
    }

    pub fn is_running(&self) -> bool {
        !self.stopped && self.error.is_none() && self.pc < self.code.len()
    }

    pub fn pop(&mut self) -> Result<Word, VmError> {
        self.stack.pop().ok_or(VmError::StackUnderflow)
    }

    pub fn push(&mut self, value: Word) -> Result<(), VmError> {
        if self.stack.len() >= STACK_LIMIT {
            return Err(VmError::StackOverflow);
        }
        self.stack.push(value);
        Ok(())
    }

    /// Element `depth` positions below the top, `0` being the top itself.
    pub fn peek(&self, depth: usize) -> Result<Word, VmError> {
        self.stack
            .len()
            .checked_sub(depth + 1)
            .map(|index| self.stack[index])
            .ok_or(VmError::StackUnderflow)
    }
}

fn scan_jump_destinations(code: &[u8]) -> AHashSet<usize> {
    let mut valid_jumps = AHashSet::new();
    let mut pc = 0;
    while pc < code.len() {
        let opcode = Opcode::decode(code[pc]);
        if opcode == Opcode::JumpDest {
            valid_jumps.insert(pc);
        }
        pc += 1 + opcode.push_size().unwrap_or(0);
    }
    valid_jumps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jumpdest_scan_skips_push_data() {
        // PUSH2 0x5b5b, JUMPDEST, PUSH1 <truncated>
        let state = RunState::new(RunArgs::new(vec![0x61, 0x5b, 0x5b, 0x5b, 0x60]));
        assert_eq!(state.valid_jumps.len(), 1);
        assert!(state.valid_jumps.contains(&3));
    }

    #[test]
    fn test_caller_defaults_to_origin() {
        let origin = H160::repeat_byte(0x11);
        let state = RunState::new(RunArgs::new(vec![]).with_origin(origin));
        assert_eq!(state.caller, origin);

        let caller = H160::repeat_byte(0x22);
        let state = RunState::new(
            RunArgs::new(vec![])
                .with_origin(origin)
                .with_caller(caller),
        );
        assert_eq!(state.caller, caller);
    }

    #[test]
    fn test_resumed_memory_is_word_aligned() {
        let state = RunState::new(RunArgs::new(vec![0x00]).with_memory(vec![1; 33]));
        assert_eq!(state.memory.word_count(), 2);
        assert!(state.is_running());
    }
}
