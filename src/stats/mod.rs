//! Statistics collection and reporting module
//!
//! Miners emit [`MinerEvent`]s (hash counts, template adoptions,
//! submissions); the [`StatsReporter`] tallies them and periodically logs
//! hash rate and host load.

/// Submodule containing the statistics reporter implementation
pub mod reporter;

// Re-export main components
pub use reporter::{HardwareStats, MinerEvent, MiningStats, StatsReporter};
