// src/miner/mod.rs
//! Core mining functionality
//!
//! This module contains all components related to the nonce search:
//! - Hash function and target comparison
//! - Nonce layout and the candidate being searched
//! - The handoff between a Listener and its Miner
//! - The Miner loop and the worker pair lifecycle

/// Proof-of-work hash functions
pub mod algorithm;

/// Current search candidate with in-place nonce updates
pub mod candidate;

/// Single-slot latest-value handoff
pub mod handoff;

/// Nonce prefix/counter layout
pub mod nonce;

/// Worker pair lifecycle
///
/// Builds one (Listener, Miner) pair per worker, runs them on a shared
/// runtime and reconnects after transport failures.
pub mod scheduler;

/// Proof-of-work target
pub mod target;

/// Miner loop
///
/// Hashes candidates, adopts new templates between attempts and submits
/// solutions.
pub mod worker;

// Re-export main components for cleaner imports
pub use self::algorithm::{Algorithm, Blake2s};
pub use self::candidate::Candidate;
pub use self::handoff::Handoff;
pub use self::scheduler::{Scheduler, WorkerContext, run_worker};
pub use self::target::Target;
pub use self::worker::{Miner, MinerSettings, Step};
