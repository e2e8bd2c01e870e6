//! Marabu Miner - proof-of-work block miner in Rust
//!
//! This crate connects to a node, receives candidate block templates and
//! searches the nonce space until a block's Blake2s-256 id falls below the
//! target, then submits the solved block back over the same connection:
//! - One (Listener, Miner) worker pair per CPU core
//! - Most-recent-wins template handoff; a new template restarts the search
//! - Reconnect with backoff after transport failures
//! - Hash rate statistics and benchmarking

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Miner core implementation: nonce search, targets, worker pairs
pub mod miner;

/// Network communication with the node
pub mod network;

/// Statistics collection and reporting functionality
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::Config;
pub use miner::{Algorithm, Blake2s, Handoff, Miner, MinerSettings, Scheduler, Target};
pub use network::{Listener, NodeConfig};
pub use stats::{MinerEvent, MiningStats, StatsReporter};
pub use types::{Block, DecodePolicy, SolvePolicy};
pub use utils::{MinerError, init_logging};
