// src/cli/commands.rs
use crate::types::{DecodePolicy, SolvePolicy};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Marabu Miner CLI - proof-of-work block miner in Rust
#[derive(Parser, Debug)]
#[command(name = "marabu-miner-rs")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (start mining, run benchmarks, or generate config)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the miner application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Connect to a node and mine the templates it sends
    Start(StartOptions),

    /// Measure local hash rate against a synthetic template
    Benchmark(BenchmarkOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for starting the mining operation
#[derive(Parser, Debug)]
pub struct StartOptions {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Number of worker pairs to run (overrides config)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Node address as host:port (overrides config)
    #[arg(short, long)]
    pub node: Option<String>,

    /// Proof-of-work target as 64 hex characters (overrides config)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Behaviour after a solved block (overrides config)
    #[arg(long)]
    pub after_solve: Option<SolvePolicy>,

    /// Handling of malformed messages (overrides config)
    #[arg(long)]
    pub on_decode_error: Option<DecodePolicy>,
}

/// Options for running mining benchmarks
#[derive(Parser, Debug)]
pub struct BenchmarkOptions {
    /// Duration of benchmark in seconds
    #[arg(short, long, default_value_t = 10)]
    pub duration: u64,

    /// Number of threads to use
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,

    /// Node address written into the template
    #[arg(short, long, default_value = "127.0.0.1:19000")]
    pub node: String,
}
