//! BerryVM dispute client.
//!
//! Plays the bisection game against an external verifier over a committed
//! trace: both parties descend their Merkle trees round by round until they
//! disagree on a single step, which is then settled with a single-step
//! proof.

mod client;
mod config;
mod error;
mod verifier;

pub use client::{BisectionClient, DisputeSession, Outcome, Role};
pub use config::DisputeConfig;
pub use error::DisputeError;
pub use verifier::{DisputeRound, PathPair, Verifier, VerifierError, VerifierEvent};
