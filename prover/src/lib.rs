//! BerryVM commitment and proving pipeline.
//!
//! Turns a recorded trace into a Merkle commitment over per-step state
//! hashes, proves the final return data against its root and builds the
//! single-step proofs a bisection game ends with.

pub mod encoding;
pub mod error;
pub mod merkle;
pub mod proof;
pub mod state_hash;

pub use encoding::SUBMIT_PROOF_SELECTOR;
pub use error::{ProverError, Result};
pub use merkle::{Child, Link, MerkleNode, MerkleTree, NodeId};
pub use proof::{ExecutionInput, ProofHashes, StepProof};
pub use state_hash::{initial_state_hash, pre_state_hash, state_hash};
