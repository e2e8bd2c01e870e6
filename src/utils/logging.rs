// src/utils/logging.rs
//! Logging configuration and utilities
//!
//! Sets up `env_logger` for the miner binary. Mining runs default to `info`,
//! benchmarks to `debug`; `RUST_LOG` overrides either.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes the logging subsystem for mining runs
///
/// # Configuration
/// - Logs to stdout
/// - Default log level: Info
/// - Respects `RUST_LOG` environment variable if set
pub fn init_logging() {
    init_with_default(LevelFilter::Info);
}

/// Configures benchmark-specific logging
///
/// Same format as [`init_logging`], but defaults to Debug so per-thread
/// progress lines are visible.
pub fn init_bench_logging() {
    init_with_default(LevelFilter::Debug);
}

fn init_with_default(level: LevelFilter) {
    let mut builder = line_format();

    if env::var("RUST_LOG").is_err() {
        builder.filter_level(level);
    } else {
        builder.parse_env("RUST_LOG");
    }

    // a logger may already be installed (tests)
    let _ = builder.try_init();
}

/// `[<secs> <LEVEL> <module>:<line>] <message>` on stdout
fn line_format() -> Builder {
    let mut builder = Builder::new();
    builder.target(Target::Stdout).format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "[{} {:<5} {}:{}] {}",
            buf.timestamp_seconds(),
            record.level(),
            record.module_path().unwrap_or("?"),
            record.line().unwrap_or(0),
            record.args()
        )
    });
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init_logging();
        init_bench_logging();
        log::debug!("logger already installed");
    }
}
