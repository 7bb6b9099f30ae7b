//! The two-axis protocol: M parties each hold a sub-circuit of N rows on the X axis,
//! the parties themselves are the points of the Y axis. Rank 0 derives the challenges
//! and assembles the proof.

/// Module for the point-to-point transport between parties.
pub mod transport;

/// Module for the challenge source and the lock-step exchanges.
pub mod coordinator;

/// Module for indexer.
pub mod indexer;

/// Module for help functions.
pub(crate) mod helpers;

/// Module for prover.
pub mod prover;

/// Module for verifier.
pub mod verifier;
