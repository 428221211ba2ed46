//! In-process verifier playing the bisection game between two parties.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use berry_dispute::{DisputeRound, PathPair, Verifier, VerifierError, VerifierEvent};
use berry_prover::{MerkleTree, StepProof};
use berry_vm::{
    trace::hashing::{keccak_pair, ZERO_HASH},
    RunArgs, TraceRecorder,
};
use ethereum_types::H256;
use futures::{stream::BoxStream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

/// Initial response window.
pub const ROUND_TIMEOUT: u64 = 100;

#[derive(Debug, Default)]
struct Game {
    round: DisputeRound,
    /// Level of the awaited nodes, the root level first.
    level: usize,
    solver_answer: Option<PathPair>,
    challenger_answer: Option<PathPair>,
    awaiting_proof: bool,
    finished: bool,
}

#[derive(Debug, Default)]
struct Ledger {
    games: HashMap<H256, Game>,
    clock: u64,
    honest_solver: bool,
    failures: HashMap<bool, VecDeque<VerifierError>>,
    responses: Vec<(bool, PathPair, PathPair)>,
    proofs: Vec<(bool, StepProof)>,
    claims: usize,
}

#[derive(Clone)]
pub struct MockVerifier {
    ledger: Arc<Mutex<Ledger>>,
    events: broadcast::Sender<VerifierEvent>,
}

impl MockVerifier {
    /// The party named by `honest_solver` wins once it proves its step.
    pub fn new(honest_solver: bool) -> Self {
        let (events, _) = broadcast::channel(256);
        let ledger = Ledger {
            honest_solver,
            ..Ledger::default()
        };
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            events,
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap()
    }

    pub fn open(&self, id: H256, solver_root: H256, challenger_root: H256, depth: usize) {
        let mut ledger = self.ledger();
        let timeout = ledger.clock + ROUND_TIMEOUT;
        ledger.games.insert(
            id,
            Game {
                round: DisputeRound {
                    solver_path: solver_root,
                    challenger_path: challenger_root,
                    witness: ZERO_HASH,
                    tree_depth: depth,
                    timeout,
                    ..DisputeRound::default()
                },
                level: depth - 1,
                ..Game::default()
            },
        );
    }

    /// Handle acting on behalf of one party.
    pub fn party(&self, is_solver: bool) -> Arc<dyn Verifier> {
        Arc::new(Party {
            verifier: self.clone(),
            is_solver,
        })
    }

    /// Errors returned by the next `respond` calls of a party, in order.
    /// `RoundAdvanced` is returned after the response was recorded.
    pub fn fail_respond(&self, is_solver: bool, errors: Vec<VerifierError>) {
        self.ledger()
            .failures
            .entry(is_solver)
            .or_default()
            .extend(errors);
    }

    pub fn set_clock(&self, clock: u64) {
        self.ledger().clock = clock;
    }

    /// Overrides what the verifier awaits from the solver.
    pub fn set_solver_path(&self, id: H256, path: H256, recorded: PathPair) {
        let mut ledger = self.ledger();
        let game = ledger.games.get_mut(&id).unwrap();
        game.round.solver_path = path;
        game.round.solver = recorded;
    }

    /// Responses so far: `(is_solver, children, witness)`.
    pub fn responses(&self) -> Vec<(bool, PathPair, PathPair)> {
        self.ledger().responses.clone()
    }

    pub fn proofs(&self) -> Vec<(bool, StepProof)> {
        self.ledger().proofs.clone()
    }

    pub fn claims(&self) -> usize {
        self.ledger().claims
    }

    fn advance(&self, id: H256, game: &mut Game, clock: u64) {
        let (Some(solver), Some(challenger)) = (game.solver_answer, game.challenger_answer) else {
            return;
        };
        game.solver_answer = None;
        game.challenger_answer = None;

        if game.level == 0 {
            game.awaiting_proof = true;
        } else {
            game.level -= 1;
            let round = &mut game.round;
            if solver.left != challenger.left {
                round.solver_path = solver.left;
                round.challenger_path = challenger.left;
                round.witness = ZERO_HASH;
            } else {
                round.solver_path = solver.right;
                round.challenger_path = challenger.right;
                round.witness = solver.left;
            }
        }

        game.round.timeout = clock + ROUND_TIMEOUT;
        let _ = self.events.send(VerifierEvent::NewRound {
            dispute_id: id,
            timeout: game.round.timeout,
            solver_path: game.round.solver_path,
            challenger_path: game.round.challenger_path,
        });
    }
}

struct Party {
    verifier: MockVerifier,
    is_solver: bool,
}

#[async_trait]
impl Verifier for Party {
    async fn dispute(&self, id: H256) -> Result<DisputeRound, VerifierError> {
        let ledger = self.verifier.ledger();
        ledger
            .games
            .get(&id)
            .map(|game| game.round.clone())
            .ok_or_else(|| VerifierError::Rejected("unknown dispute".into()))
    }

    async fn respond(
        &self,
        id: H256,
        left: H256,
        right: H256,
        witness_left: H256,
        witness_right: H256,
    ) -> Result<(), VerifierError> {
        let mut ledger = self.verifier.ledger();
        let injected = ledger
            .failures
            .get_mut(&self.is_solver)
            .and_then(VecDeque::pop_front);
        let report = match injected {
            Some(VerifierError::RoundAdvanced) => Err(VerifierError::RoundAdvanced),
            Some(err) => return Err(err),
            None => Ok(()),
        };

        let clock = ledger.clock;
        let Ledger {
            games, responses, ..
        } = &mut *ledger;
        let game = games
            .get_mut(&id)
            .ok_or_else(|| VerifierError::Rejected("unknown dispute".into()))?;
        if game.finished || game.awaiting_proof {
            return Err(VerifierError::RoundAdvanced);
        }

        let (path, answer, recorded) = if self.is_solver {
            (
                game.round.solver_path,
                &mut game.solver_answer,
                &mut game.round.solver,
            )
        } else {
            (
                game.round.challenger_path,
                &mut game.challenger_answer,
                &mut game.round.challenger,
            )
        };
        if keccak_pair(&left, &right) != path {
            return Err(VerifierError::Rejected("children do not hash to path".into()));
        }
        if answer.is_some() {
            return Err(VerifierError::RoundAdvanced);
        }

        let pair = PathPair { left, right };
        *answer = Some(pair);
        *recorded = pair;
        responses.push((
            self.is_solver,
            pair,
            PathPair {
                left: witness_left,
                right: witness_right,
            },
        ));

        self.verifier.advance(id, game, clock);
        report
    }

    async fn claim_timeout(&self, id: H256) -> Result<(), VerifierError> {
        let mut ledger = self.verifier.ledger();
        let clock = ledger.clock;
        let game = ledger
            .games
            .get_mut(&id)
            .ok_or_else(|| VerifierError::Rejected("unknown dispute".into()))?;
        if game.round.timeout == 0 || game.round.timeout >= clock {
            return Err(VerifierError::Rejected("not timed out".into()));
        }
        game.round.timeout = 0;
        game.finished = true;
        ledger.claims += 1;
        Ok(())
    }

    async fn submit_proof(&self, calldata: Vec<u8>) -> Result<(), VerifierError> {
        let (id, proof) = StepProof::decode(&calldata)
            .map_err(|err| VerifierError::Rejected(err.to_string()))?;

        let mut ledger = self.verifier.ledger();
        let honest_solver = ledger.honest_solver;
        ledger.proofs.push((self.is_solver, proof));

        let game = ledger
            .games
            .get_mut(&id)
            .ok_or_else(|| VerifierError::Rejected("unknown dispute".into()))?;
        if !game.awaiting_proof {
            return Err(VerifierError::Rejected("no leaf reached".into()));
        }
        if game.finished {
            return Err(VerifierError::RoundAdvanced);
        }
        if self.is_solver != honest_solver {
            return Err(VerifierError::Rejected("invalid step".into()));
        }

        game.finished = true;
        game.round.timeout = 0;
        let _ = self.verifier.events.send(VerifierEvent::Slashed {
            dispute_id: id,
            solver_won: honest_solver,
        });
        Ok(())
    }

    async fn timestamp(&self) -> Result<u64, VerifierError> {
        Ok(self.verifier.ledger().clock)
    }

    fn subscribe(&self) -> BoxStream<'static, VerifierEvent> {
        futures::stream::unfold(self.verifier.events.subscribe(), |mut events| async move {
            loop {
                match events.recv().await {
                    Ok(event) => return Some((event, events)),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

/// `steps - 1` pushes of `values` followed by a STOP.
pub fn pushes(values: &[u8]) -> Vec<u8> {
    let mut code = values
        .iter()
        .flat_map(|value| [0x60, *value])
        .collect::<Vec<_>>();
    code.push(0x00);
    code
}

pub fn commit(code: Vec<u8>) -> MerkleTree {
    MerkleTree::from_trace(TraceRecorder::default().run(RunArgs::new(code))).unwrap()
}
