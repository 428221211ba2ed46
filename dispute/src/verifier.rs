//! The external verifier the bisection game is played against.

use async_trait::async_trait;
use ethereum_types::H256;
use futures::stream::BoxStream;
use thiserror::Error;

/// Children a party submitted in its last response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathPair {
    pub left: H256,
    pub right: H256,
}

/// On-chain view of a dispute. Read again every round, never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisputeRound {
    /// Node hash the verifier awaits the solver's children for.
    pub solver_path: H256,
    pub challenger_path: H256,
    /// Previously agreed node whose children accompany the next response,
    /// zero if none.
    pub witness: H256,
    /// Tree depth both parties committed to, leaves included.
    pub tree_depth: usize,
    /// Deadline for the pending response; zero once the dispute is over.
    pub timeout: u64,
    pub solver: PathPair,
    pub challenger: PathPair,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierEvent {
    NewRound {
        dispute_id: H256,
        timeout: u64,
        solver_path: H256,
        challenger_path: H256,
    },
    Slashed {
        dispute_id: H256,
        solver_won: bool,
    },
}

impl VerifierEvent {
    pub fn dispute_id(&self) -> H256 {
        match self {
            Self::NewRound { dispute_id, .. } | Self::Slashed { dispute_id, .. } => *dispute_id,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifierError {
    /// Transport or submission failure worth retrying.
    #[error("transient verifier failure: {0}")]
    Transient(String),

    /// The round moved on before this submission landed.
    #[error("round already advanced")]
    RoundAdvanced,

    #[error("rejected by verifier: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Verifier: Send + Sync {
    async fn dispute(&self, id: H256) -> Result<DisputeRound, VerifierError>;

    async fn respond(
        &self,
        id: H256,
        left: H256,
        right: H256,
        witness_left: H256,
        witness_right: H256,
    ) -> Result<(), VerifierError>;

    async fn claim_timeout(&self, id: H256) -> Result<(), VerifierError>;

    /// Submits encoded single-step proof calldata.
    async fn submit_proof(&self, calldata: Vec<u8>) -> Result<(), VerifierError>;

    /// Current verifier clock, comparable with [`DisputeRound::timeout`].
    async fn timestamp(&self) -> Result<u64, VerifierError>;

    /// Events of every dispute, from now on.
    fn subscribe(&self) -> BoxStream<'static, VerifierEvent>;
}
