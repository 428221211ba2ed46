use tracing::{debug, trace};

use super::{ExecutionContext, RunArgs, RunState, VmError, STACK_LIMIT};
use crate::{
    config::VmConfig,
    host::{BaseHost, HostEnvironment},
    opcodes::Opcode,
    stats::ExecutionStats,
};

/// Steps bytecode one instruction at a time.
///
/// The interpreter is stateless apart from its host and counters, so the
/// same instance can run any number of programs in sequence.
pub struct Interpreter {
    host: Box<dyn HostEnvironment>,
    config: VmConfig,
    stats: ExecutionStats,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Box::new(BaseHost))
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("config", &self.config)
            .field("steps", &self.stats.total_steps())
            .finish_non_exhaustive()
    }
}

impl Interpreter {
    pub fn new(host: Box<dyn HostEnvironment>) -> Self {
        Self {
            host,
            config: VmConfig::default(),
            stats: ExecutionStats::default(),
        }
    }

    pub fn with_config(mut self, config: VmConfig) -> Self {
        self.config = config;
        self
    }

    pub const fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn host(&self) -> &dyn HostEnvironment {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> &mut dyn HostEnvironment {
        self.host.as_mut()
    }

    pub const fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    pub fn initialize(&self, args: RunArgs) -> RunState {
        RunState::new(args)
    }

    /// Executes the instruction at `state.pc`.
    ///
    /// On error, and when the instruction halts, the program counter is left
    /// on the executing instruction. Memory and calldata access tracking
    /// describes this step only.
    pub fn step(&mut self, state: &mut RunState) -> Result<(), VmError> {
        let pc = state.pc;
        // Running off the end of the code is an implicit STOP.
        let byte = state.code.get(pc).copied().unwrap_or(u8::from(Opcode::Stop));
        let info = Opcode::lookup(byte);

        state.memory.reset_tracking();
        state.call_data.reset_tracking();
        state.opcode = info.opcode;

        let result = check_stack(state, info.stack_in, info.stack_out).and_then(|()| {
            state.pc += 1;
            let mut ctx = ExecutionContext::new(state, self.host.as_mut(), &self.config);
            info.opcode.execute(&mut ctx)
        });

        state.error = result.err();
        if state.error.is_some() || state.stopped {
            state.pc = pc;
        }
        self.stats.record(info.opcode, state.error);

        trace!(
            pc,
            opcode = info.name,
            errno = state.errno(),
            next_pc = state.pc,
            depth = state.stack.len(),
            "step"
        );
        result
    }

    /// Steps until the run halts, fails, runs out of code or `step_count`
    /// steps were executed (zero meaning no limit). Returns the number of
    /// steps executed.
    pub fn resume(&mut self, state: &mut RunState, step_count: usize) -> usize {
        let mut executed = 0;
        while state.is_running() {
            // The error is recorded in the state and ends the loop.
            let _ = self.step(state);
            executed += 1;
            if step_count != 0 && executed == step_count {
                break;
            }
        }
        executed
    }

    pub fn run(&mut self, args: RunArgs) -> RunState {
        let step_count = args.step_count;
        let mut state = self.initialize(args);
        let executed = self.resume(&mut state, step_count);
        debug!(
            steps = executed,
            pc = state.pc,
            errno = state.errno(),
            stopped = state.stopped,
            return_len = state.return_value.len(),
            "run finished"
        );
        state
    }
}

fn check_stack(state: &RunState, stack_in: usize, stack_out: usize) -> Result<(), VmError> {
    let depth = state.stack.len();
    if depth < stack_in {
        return Err(VmError::StackUnderflow);
    }
    if depth - stack_in + stack_out > STACK_LIMIT {
        return Err(VmError::StackOverflow);
    }
    Ok(())
}
