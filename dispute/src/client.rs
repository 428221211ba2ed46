//! Bisection client.
//!
//! A [`DisputeSession`] walks the local Merkle tree in step with the
//! verifier: every round it answers the node the verifier awaits with that
//! node's children, until the disputed node is a leaf and a single-step
//! proof settles the game. Sessions run one per dispute, each on its own
//! task, and share the committed tree.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use berry_prover::{MerkleNode, MerkleTree, StepProof};
use berry_vm::trace::hashing::ZERO_HASH;
use ethereum_types::H256;
use futures::StreamExt;
use tokio::{
    task::JoinHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::DisputeConfig,
    error::DisputeError,
    verifier::{DisputeRound, PathPair, Verifier, VerifierError, VerifierEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Solver,
    Challenger,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solver => f.write_str("solver"),
            Self::Challenger => f.write_str("challenger"),
        }
    }
}

/// How a dispute ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The verifier reports no pending timeout.
    Resolved,
    Slashed { solver_won: bool },
}

/// Spawns one session per dispute against a shared verifier.
#[derive(Clone)]
pub struct BisectionClient {
    verifier: Arc<dyn Verifier>,
    config: DisputeConfig,
}

impl BisectionClient {
    pub fn new(verifier: Arc<dyn Verifier>, config: DisputeConfig) -> Self {
        Self { verifier, config }
    }

    /// Plays dispute `id` over `tree` on a new task.
    pub fn spawn(&self, id: H256, tree: MerkleTree) -> JoinHandle<Result<Outcome, DisputeError>> {
        let verifier = self.verifier.clone();
        let config = self.config.clone();
        tokio::spawn(async move {
            let session = DisputeSession::start(verifier, id, tree, config).await?;
            session.run().await
        })
    }
}

pub struct DisputeSession {
    verifier: Arc<dyn Verifier>,
    id: H256,
    tree: MerkleTree,
    config: DisputeConfig,
    role: Role,
    /// Node whose children were answered last.
    current: MerkleNode,
    proof_submitted: bool,
}

impl DisputeSession {
    /// Reads the dispute, takes the solver role if the verifier's solver path
    /// is the local root and checks both sides committed to the same depth.
    pub async fn start(
        verifier: Arc<dyn Verifier>,
        id: H256,
        tree: MerkleTree,
        config: DisputeConfig,
    ) -> Result<Self, DisputeError> {
        let mut session = Self {
            verifier,
            id,
            current: *tree.root(),
            tree,
            config,
            role: Role::Challenger,
            proof_submitted: false,
        };

        let dispute = session.read_dispute().await?;
        if dispute.solver_path == session.tree.root_hash() {
            session.role = Role::Solver;
        }
        if dispute.tree_depth != session.tree.depth() {
            warn!(
                dispute = %id,
                role = %session.role,
                local = session.tree.depth(),
                remote = dispute.tree_depth,
                "tree size mismatch"
            );
            return Err(DisputeError::TreeDepthMismatch {
                local: session.tree.depth(),
                remote: dispute.tree_depth,
            });
        }

        info!(dispute = %id, role = %session.role, depth = dispute.tree_depth, "dispute joined");
        Ok(session)
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub const fn current(&self) -> &MerkleNode {
        &self.current
    }

    pub const fn proof_submitted(&self) -> bool {
        self.proof_submitted
    }

    /// Answers the current round, and submits the single-step proof once
    /// the disputed node is a leaf.
    #[instrument(level = "debug", skip_all, fields(dispute = %self.id, role = %self.role))]
    pub async fn submit_round(&mut self) -> Result<(), DisputeError> {
        if self.current.is_leaf() {
            return self.submit_proof().await;
        }

        let dispute = self.read_dispute().await?;
        let (target, recorded) = match self.role {
            Role::Solver => (dispute.solver_path, dispute.solver),
            Role::Challenger => (dispute.challenger_path, dispute.challenger),
        };

        let Some(next) = self.tree.get_node(&target).copied() else {
            info!("awaited node not found, submission already made");
            if let Some(node) = self.tree.get_pair(&recorded.left, &recorded.right) {
                self.current = *node;
            }
            return Ok(());
        };

        if self.current.left.hash == target {
            debug!(from = %self.current.hash, to = %target, "goes left");
        } else if self.current.right.hash == target {
            debug!(from = %self.current.hash, to = %target, "goes right");
        }

        let witness = self.witness(&dispute)?;
        info!(left = %next.left.hash, right = %next.right.hash, "responding");

        let verifier = self.verifier.clone();
        let id = self.id;
        let result = self
            .retry("respond", || {
                verifier.respond(
                    id,
                    next.left.hash,
                    next.right.hash,
                    witness.left,
                    witness.right,
                )
            })
            .await;

        match result {
            Ok(()) => {}
            Err(DisputeError::Verifier(VerifierError::RoundAdvanced)) => {
                debug!("round already advanced");
            }
            Err(DisputeError::Verifier(VerifierError::Rejected(reason))) => {
                warn!(%reason, "response rejected");
                return Ok(());
            }
            Err(err) => return Err(err),
        }

        self.current = next;
        Ok(())
    }

    /// Claims the timeout if the pending response is overdue. Returns
    /// [`Outcome::Resolved`] once the verifier reports no timeout.
    #[instrument(level = "debug", skip_all, fields(dispute = %self.id, role = %self.role))]
    pub async fn check_timeout(&self) -> Result<Option<Outcome>, DisputeError> {
        let dispute = self.read_dispute().await?;
        if dispute.timeout == 0 {
            info!("dispute resolved");
            return Ok(Some(Outcome::Resolved));
        }

        let verifier = self.verifier.clone();
        let now = self.retry("timestamp", || verifier.timestamp()).await?;
        let timed_out = dispute.timeout < now;
        debug!(timed_out, timeout = dispute.timeout, now, "timeout checked");

        if timed_out {
            let id = self.id;
            match self.retry("claim_timeout", || verifier.claim_timeout(id)).await {
                Ok(()) => info!("timeout claimed"),
                Err(DisputeError::Verifier(
                    VerifierError::RoundAdvanced | VerifierError::Rejected(_),
                )) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }

    /// Event loop of the session: answers every new round of this dispute
    /// and polls for timeouts until the dispute is resolved or slashed.
    #[instrument(level = "info", skip_all, fields(dispute = %self.id, role = %self.role))]
    pub async fn run(mut self) -> Result<Outcome, DisputeError> {
        let mut events = self.verifier.subscribe();
        let period = self.config.poll_interval().max(Duration::from_millis(1));
        let mut poll = interval_at(Instant::now() + period, period);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.submit_round().await?;

        loop {
            tokio::select! {
                event = events.next() => match event {
                    Some(event) if event.dispute_id() != self.id => {}
                    Some(VerifierEvent::NewRound { .. }) => {
                        info!("new round");
                        self.submit_round().await?;
                    }
                    Some(VerifierEvent::Slashed { solver_won, .. }) => {
                        info!(solver_won, "slashed");
                        return Ok(Outcome::Slashed { solver_won });
                    }
                    None => return Err(DisputeError::EventStreamClosed),
                },
                _ = poll.tick() => {
                    if let Some(outcome) = self.check_timeout().await? {
                        return Ok(outcome);
                    }
                }
            }
        }
    }

    async fn submit_proof(&mut self) -> Result<(), DisputeError> {
        if self.proof_submitted {
            return Ok(());
        }

        let proof = StepProof::build(&self.tree, &self.current)?;
        let calldata = proof.encode(&self.id);
        info!(
            left = %self.current.left.hash,
            right = %self.current.right.hash,
            pc = proof.execution_input.pc,
            bytes = calldata.len(),
            "submitting proof"
        );

        let verifier = self.verifier.clone();
        match self
            .retry("submit_proof", || verifier.submit_proof(calldata.clone()))
            .await
        {
            Ok(()) | Err(DisputeError::Verifier(VerifierError::RoundAdvanced)) => {}
            Err(DisputeError::Verifier(VerifierError::Rejected(reason))) => {
                warn!(%reason, "proof rejected");
            }
            Err(err) => return Err(err),
        }
        self.proof_submitted = true;
        Ok(())
    }

    fn witness(&self, dispute: &DisputeRound) -> Result<PathPair, DisputeError> {
        if dispute.witness == ZERO_HASH {
            return Ok(PathPair::default());
        }
        let node = self
            .tree
            .get_node(&dispute.witness)
            .ok_or(DisputeError::UnknownWitness(dispute.witness))?;
        Ok(PathPair {
            left: node.left.hash,
            right: node.right.hash,
        })
    }

    async fn read_dispute(&self) -> Result<DisputeRound, DisputeError> {
        let verifier = self.verifier.clone();
        let id = self.id;
        self.retry("dispute", || verifier.dispute(id)).await
    }

    /// Runs `op`, retrying transient failures after the configured backoff.
    async fn retry<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, DisputeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, VerifierError>>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match op().await {
                Err(VerifierError::Transient(reason)) => {
                    if self
                        .config
                        .max_retries
                        .is_some_and(|max_retries| attempts > max_retries)
                    {
                        return Err(DisputeError::RetriesExhausted {
                            operation,
                            attempts,
                        });
                    }
                    warn!(operation, attempts, %reason, "transient failure, retrying");
                    sleep(self.config.retry_backoff()).await;
                }
                result => return result.map_err(DisputeError::from),
            }
        }
    }
}
