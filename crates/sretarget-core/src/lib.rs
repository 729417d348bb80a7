//! sretarget core: transport-agnostic probe state, chaos engine, and errors.
//!
//! This crate defines the state shared by every request handled by the
//! server: the liveness/readiness flags, the randomness source behind fault
//! injection, and the error surface. It carries no HTTP or async-runtime
//! dependencies so it can be reused by tooling and tests directly.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `SreError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod chaos;
pub mod error;
pub mod probe;

/// Shared result type.
pub use error::{Result, SreError};

pub use chaos::{ChaosDecision, ChaosEngine, ChaosSettings, TERMINATION_EXIT_CODE};
pub use probe::ProbeState;
