//! Step-by-step recording of a run.
//!
//! Each executed instruction yields an [`ExecutionStep`] carrying the
//! compact stack delta, the rolling stack hash, the memory image with its
//! hash and the byte ranges of memory and calldata the instruction touched.

pub mod hashing;
mod recorder;
mod step;

pub use recorder::{Trace, TraceRecorder};
pub use step::ExecutionStep;
