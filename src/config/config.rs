// src/config/config.rs
use crate::{
    miner::{target::Target, worker::MinerSettings},
    network::node::NodeConfig,
    types::{DecodePolicy, SolvePolicy},
    utils::error::MinerError,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the mining application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Number of worker pairs (0 = one per CPU core)
    #[serde(default)]
    pub worker_threads: usize,

    /// Proof-of-work threshold as 64 lower-case hex characters
    #[serde(default = "default_target")]
    pub target: String,

    /// Hash attempts between checks for a new template
    #[serde(default = "default_poll_every")]
    pub poll_every: u64,

    /// Hash attempts between progress log lines (0 = off)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Seconds between statistics reports
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,

    /// What a miner does after submitting a block
    #[serde(default)]
    pub after_solve: SolvePolicy,

    /// What a listener does with a message it cannot decode
    #[serde(default)]
    pub on_decode_error: DecodePolicy,

    /// Upstream node settings
    pub node: NodeConfig,
}

fn default_target() -> String {
    Target::default().to_string()
}

fn default_poll_every() -> u64 {
    1
}

fn default_progress_interval() -> u64 {
    10_000_000
}

fn default_stats_interval() -> u64 {
    60
}

impl Config {
    /// Configuration with defaults for everything but the node
    pub fn new(node: NodeConfig) -> Self {
        Config {
            worker_threads: 0,
            target: default_target(),
            poll_every: default_poll_every(),
            progress_interval: default_progress_interval(),
            stats_interval_secs: default_stats_interval(),
            after_solve: SolvePolicy::default(),
            on_decode_error: DecodePolicy::default(),
            node,
        }
    }

    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(MinerError)` - If file couldn't be read, parsed or validated
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_str)
            .map_err(|e| MinerError::ConfigError(format!("Invalid config format: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot check on its own
    pub fn validate(&self) -> Result<(), MinerError> {
        Target::from_hex(&self.target)
            .map_err(|e| MinerError::ConfigError(format!("Invalid target: {}", e)))?;
        if self.poll_every == 0 {
            return Err(MinerError::ConfigError(
                "poll_every must be at least 1".into(),
            ));
        }
        if self.stats_interval_secs == 0 {
            return Err(MinerError::ConfigError(
                "stats_interval_secs must be at least 1".into(),
            ));
        }
        if self.node.address.trim().is_empty() {
            return Err(MinerError::ConfigError("node.address is empty".into()));
        }
        Ok(())
    }

    /// Effective number of worker pairs
    pub fn worker_count(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get()
        } else {
            self.worker_threads
        }
    }

    /// Search-loop settings derived from this configuration
    pub fn miner_settings(&self) -> Result<MinerSettings, MinerError> {
        self.validate()?;
        Ok(MinerSettings {
            target: Target::from_hex(&self.target)?,
            poll_every: self.poll_every,
            progress_interval: self.progress_interval,
            after_solve: self.after_solve,
            ..MinerSettings::default()
        })
    }

    /// Statistics report period
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    /// Generates a commented configuration template
    ///
    /// The output parses back into a valid `Config`.
    pub fn generate_template(address: &str) -> String {
        let mut template = String::new();
        template.push_str("# Marabu Miner Configuration\n\n");
        template.push_str("# Number of worker pairs (0 = one per CPU core)\n");
        template.push_str("worker_threads = 0\n");
        template.push_str("# Block hashes must be strictly below this value\n");
        template.push_str(&format!("target = \"{}\"\n", default_target()));
        template.push_str("# Hash attempts between checks for a new template\n");
        template.push_str("poll_every = 1\n");
        template.push_str("# Hash attempts between progress log lines (0 = off)\n");
        template.push_str("progress_interval = 10000000\n");
        template.push_str("# Seconds between statistics reports\n");
        template.push_str("stats_interval_secs = 60\n");
        template.push_str("# After a solve: \"await-template\" or \"continue\"\n");
        template.push_str("after_solve = \"await-template\"\n");
        template.push_str("# On a malformed message: \"skip\" or \"fatal\"\n");
        template.push_str("on_decode_error = \"skip\"\n\n");

        template.push_str("[node]\n");
        template.push_str(&format!("address = \"{}\"\n", address));
        template.push_str("# Drop the connection after this many silent seconds\n");
        template.push_str("# idle_timeout_secs = 300\n");
        template.push_str("reconnect_attempts = 3\n");
        template.push_str("reconnect_backoff_ms = 500\n");

        template
    }
}
