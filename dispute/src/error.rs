use berry_prover::ProverError;
use ethereum_types::H256;
use thiserror::Error;

use crate::verifier::VerifierError;

/// Errors ending a dispute session
#[derive(Debug, Error)]
pub enum DisputeError {
    /// Both parties did not commit to comparable executions
    #[error("tree depth mismatch: local {local}, verifier {remote}")]
    TreeDepthMismatch { local: usize, remote: usize },

    /// The verifier cited a witness node missing from the local tree
    #[error("witness {0:?} is not a node of the local tree")]
    UnknownWitness(H256),

    #[error(transparent)]
    Verifier(#[from] VerifierError),

    #[error("verifier event stream closed")]
    EventStreamClosed,

    #[error("{operation} failed after {attempts} attempts")]
    RetriesExhausted {
        operation: &'static str,
        attempts: usize,
    },

    #[error(transparent)]
    Prover(#[from] ProverError),
}
