use std::sync::Arc;

use ethereum_types::H256;
use smallvec::SmallVec;
use tracing::{debug, instrument};

use super::{
    hashing::{keccak, keccak_pair, stack_hashes, word_to_h256, ZERO_HASH},
    ExecutionStep,
};
use crate::{
    execution::{Interpreter, RunArgs, RunState},
    integer_ops::Word,
    opcodes::Opcode,
    stats::ExecutionStats,
};

/// Result of a recorded run.
#[derive(Debug, Clone)]
pub struct Trace {
    pub steps: Vec<ExecutionStep>,
    /// Machine state after the last step.
    pub state: RunState,
}

impl Trace {
    pub fn errno(&self) -> u8 {
        self.state.errno()
    }

    pub fn return_value(&self) -> &[u8] {
        &self.state.return_value
    }
}

/// Incrementally maintained stack hash chain.
#[derive(Debug)]
struct StackChain {
    elements: Vec<H256>,
    hashes: Vec<H256>,
}

struct StackDelta {
    consumed: SmallVec<[H256; 4]>,
    pushed: SmallVec<[H256; 4]>,
    compact_hash: H256,
}

impl StackChain {
    fn new(stack: &[Word]) -> Self {
        let elements = stack.iter().copied().map(word_to_h256).collect::<Vec<_>>();
        let hashes = stack_hashes(&elements, ZERO_HASH);
        Self { elements, hashes }
    }

    fn top_hash(&self) -> H256 {
        self.hashes.last().copied().unwrap_or(ZERO_HASH)
    }

    /// Reconciles the chain with `stack` after `opcode` ran. `SWAPn` and
    /// `DUPn` account for the entries they address, clipped to what the
    /// previous stack held.
    fn advance(&mut self, opcode: Opcode, stack: &[Word]) -> StackDelta {
        let declared = match (opcode.swap_depth(), opcode.dup_depth()) {
            (Some(depth), _) => depth * 2,
            (_, Some(depth)) => depth,
            _ => opcode.stack_io().0,
        };
        let consumed = declared.min(self.elements.len());

        if consumed == 0 && self.elements.len() == stack.len() {
            return StackDelta {
                consumed: SmallVec::new(),
                pushed: SmallVec::new(),
                compact_hash: self.top_hash(),
            };
        }

        let split = self.elements.len() - consumed;
        let consumed = self.elements.drain(split..).collect::<SmallVec<_>>();
        self.hashes.truncate(self.hashes.len() - consumed.len());
        let compact_hash = self.top_hash();

        let mut pushed = SmallVec::new();
        for value in stack.iter().skip(self.elements.len()) {
            let element = word_to_h256(*value);
            let link = keccak_pair(&self.top_hash(), &element);
            self.elements.push(element);
            self.hashes.push(link);
            pushed.push(element);
        }

        StackDelta {
            consumed,
            pushed,
            compact_hash,
        }
    }
}

/// Last serialised memory image, reused while memory stays unchanged.
#[derive(Debug, Default)]
struct MemorySnapshot {
    last: Option<(Arc<[u8]>, usize, H256)>,
}

impl MemorySnapshot {
    fn advance(&mut self, state: &RunState) -> (Arc<[u8]>, usize, H256) {
        let size = state.memory.word_count();
        match &self.last {
            Some((image, prev_size, hash))
                if state.memory.write_range().is_none() && *prev_size == size =>
            {
                (image.clone(), size, *hash)
            }
            _ => {
                let image: Arc<[u8]> = Arc::from(state.memory.as_bytes());
                let hash = keccak(&image);
                self.last = Some((image.clone(), size, hash));
                (image, size, hash)
            }
        }
    }
}

/// Runs the interpreter and records an [`ExecutionStep`] after every
/// instruction. Execution semantics are those of the wrapped interpreter.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    interpreter: Interpreter,
}

impl TraceRecorder {
    pub fn new(interpreter: Interpreter) -> Self {
        Self { interpreter }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    pub fn into_interpreter(self) -> Interpreter {
        self.interpreter
    }

    pub fn stats(&self) -> &ExecutionStats {
        self.interpreter.stats()
    }

    #[instrument(level = "debug", skip_all, fields(code_len = args.code.len(), pc = args.pc))]
    pub fn run(&mut self, args: RunArgs) -> Trace {
        let step_count = args.step_count;
        let mut state = self.interpreter.initialize(args);
        let mut stack = StackChain::new(&state.stack);
        let mut memory = MemorySnapshot::default();
        let mut steps = Vec::new();

        while state.is_running() {
            let _ = self.interpreter.step(&mut state);
            steps.push(record_step(&state, &mut stack, &mut memory));

            if step_count != 0 && steps.len() == step_count {
                break;
            }
        }

        debug!(
            steps = steps.len(),
            errno = state.errno(),
            stopped = state.stopped,
            "trace recorded"
        );
        Trace { steps, state }
    }
}

fn record_step(
    state: &RunState,
    stack: &mut StackChain,
    memory: &mut MemorySnapshot,
) -> ExecutionStep {
    let delta = stack.advance(state.opcode, &state.stack);
    let (mem, mem_size, mem_hash) = memory.advance(state);

    ExecutionStep {
        opname: state.opcode.name(),
        pc: state.pc,
        errno: state.errno(),
        return_data: state.return_value.clone(),
        compact_stack: delta.consumed,
        pushed: delta.pushed,
        compact_stack_hash: delta.compact_hash,
        stack_hash: stack.top_hash(),
        stack_size: state.stack.len(),
        mem,
        mem_size,
        mem_hash,
        mem_read: state.memory.read_range(),
        mem_write: state.memory.write_range(),
        call_data_read: state.call_data.read_range(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::hashing::stack_hash;

    #[test]
    fn test_stack_chain_tracks_swap() {
        let stack = vec![Word::from(1), Word::from(2), Word::from(3)];
        let mut chain = StackChain::new(&stack);

        let swapped = vec![Word::from(1), Word::from(3), Word::from(2)];
        let delta = chain.advance(Opcode::Swap1, &swapped);

        assert_eq!(delta.consumed.len(), 2);
        assert_eq!(delta.pushed.len(), 2);
        let expected: Vec<H256> = swapped.iter().copied().map(word_to_h256).collect();
        assert_eq!(chain.top_hash(), stack_hash(&expected, ZERO_HASH));
        assert_eq!(
            delta.compact_hash,
            stack_hash(&expected[..1], ZERO_HASH)
        );
    }

    #[test]
    fn test_unchanged_stack_has_empty_delta() {
        let stack = vec![Word::from(7)];
        let mut chain = StackChain::new(&stack);
        let before = chain.top_hash();
        let delta = chain.advance(Opcode::JumpDest, &stack);
        assert!(delta.consumed.is_empty());
        assert_eq!(delta.compact_hash, before);
    }
}
