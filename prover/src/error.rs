//! Error types for the BerryVM commitment and proving pipeline.

use thiserror::Error;

/// Errors that can occur while committing to a trace or building proofs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProverError {
    /// A tree needs at least one execution step
    #[error("at least one execution step is required")]
    EmptyTrace,

    /// Leaf slot outside the tree
    #[error("slot {slot} is out of range for {leaves} leaves")]
    StepOutOfRange { slot: usize, leaves: usize },

    /// Single-step proofs are built from leaves only
    #[error("node is not a leaf")]
    NotALeaf,

    /// Malformed proof calldata
    #[error("invalid proof encoding: {0}")]
    Decode(String),
}

/// Result type for the proving pipeline
pub type Result<T> = std::result::Result<T, ProverError>;
