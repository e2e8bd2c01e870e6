// src/config/mod.rs
//! Configuration management for the miner
//!
//! Loads and validates the TOML configuration file and generates a
//! commented template for new installations.

/// Core configuration implementation
///
/// Contains the [`Config`] struct that defines the miner's settings.
pub mod config;

// Re-export key items for easy access
pub use config::Config;

use crate::utils::error::MinerError;
use std::path::PathBuf;

/// Loads miner configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the configuration file (anything convertible to PathBuf)
///
/// # Returns
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(MinerError)` - If the file couldn't be read, parsed or validated
pub fn load(path: impl Into<PathBuf>) -> Result<Config, MinerError> {
    Config::load(path)
}

/// Generates a commented configuration template for the given node address
pub fn generate_template(address: &str) -> String {
    Config::generate_template(address)
}
