//! BerryVM interpreter.
//!
//! A deterministic stepping interpreter for EVM bytecode whose every step
//! can be recorded and committed to. The crate covers the opcode table, the
//! interpreter and its host seam, the built-in precompiles and the trace
//! recorder feeding the prover.

pub mod config;
pub mod execution;
pub mod host;
pub mod integer_ops;
pub mod memory;
pub mod opcodes;
pub mod precompiles;
pub mod stats;
pub mod trace;
mod util;

pub use config::VmConfig;
pub use execution::{Interpreter, LogEntry, RunArgs, RunState, VmError, STACK_LIMIT};
pub use host::{BaseHost, CallOutcome, HostEnvironment, HostError, MemoryHost};
pub use integer_ops::Word;
pub use memory::ByteRange;
pub use opcodes::{OpInfo, Opcode};
pub use stats::ExecutionStats;
pub use trace::{ExecutionStep, Trace, TraceRecorder};
pub use util::{init_logger, LoggerGuard};
