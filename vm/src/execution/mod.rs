mod context;
mod error;
mod interpreter;
mod ops;
mod state;

pub(crate) use context::ExecutionContext;
pub use error::VmError;
pub use interpreter::Interpreter;
pub use state::{LogEntry, RunArgs, RunState, STACK_LIMIT};
