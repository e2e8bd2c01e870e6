// src/main.rs
use clap::Parser;
use marabu_miner_rs::miner::nonce::{self, PREFIX_LEN};
use marabu_miner_rs::utils::init_bench_logging;
use marabu_miner_rs::{self, *};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

/// Main entry point for the miner
///
/// # Returns
/// - `Ok(())` on successful execution
/// - `Err(MinerError)` if any operation fails
fn main() -> Result<(), MinerError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Start(opts) => start_mining(opts),
        cli::Action::Benchmark(opts) => run_benchmark(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Starts the mining operation with given configuration options
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads configuration and applies CLI overrides
/// 3. Sets up statistics reporting
/// 4. Runs one worker pair per configured thread until they terminate
fn start_mining(opts: cli::StartOptions) -> Result<(), MinerError> {
    utils::init_logging();

    let mut config = config::load(&opts.config)?;
    // Apply CLI overrides
    if let Some(workers) = opts.workers {
        config.worker_threads = workers;
    }
    if let Some(node) = opts.node {
        config.node.address = node;
    }
    if let Some(target) = opts.target {
        config.target = target;
    }
    if let Some(policy) = opts.after_solve {
        config.after_solve = policy;
    }
    if let Some(policy) = opts.on_decode_error {
        config.on_decode_error = policy;
    }
    config.validate()?;

    // Statistics reporting
    let reporter = StatsReporter::new(config.stats_interval());
    reporter.start_reporting();

    let scheduler = Scheduler::new(&config, reporter.event_sender())?;
    log::info!(
        "Mining with {} worker(s), target {}, after solve: {}",
        scheduler.worker_count(),
        config.target,
        config.after_solve
    );

    let rt = Runtime::new()?;
    rt.block_on(scheduler.run())
}

/// Runs a local hash rate benchmark
///
/// Each thread mines its own copy of the genesis template with a distinct
/// nonce prefix; solutions are discarded.
fn run_benchmark(opts: cli::BenchmarkOptions) -> Result<(), MinerError> {
    init_bench_logging();

    if opts.threads == 0 {
        return Err(MinerError::InputError("threads must be at least 1".into()));
    }

    let reporter = StatsReporter::new(Duration::from_secs(5));
    let events = reporter.event_sender();
    let active = Arc::new(AtomicBool::new(true));
    let settings = MinerSettings {
        after_solve: SolvePolicy::Continue,
        progress_interval: 1_000_000,
        ..MinerSettings::default()
    };

    log::info!(
        "Starting {} benchmark on {} thread(s) for {} seconds",
        Blake2s::new().name(),
        opts.threads,
        opts.duration
    );

    let handles = (0..opts.threads)
        .map(|id| -> Result<_, MinerError> {
            let handoff = Arc::new(Handoff::new());
            let prefix = format!("{:0width$x}", id, width = PREFIX_LEN);
            handoff.publish(Block {
                nonce: nonce::compose(&prefix, 0)?,
                ..Block::genesis()
            });

            let (solutions, discarded) = mpsc::unbounded_channel();
            let miner = Miner::new(
                id,
                Blake2s::new(),
                handoff,
                solutions,
                active.clone(),
                settings.clone(),
            )
            .with_events(events.clone());

            Ok(std::thread::spawn(move || {
                let _discarded = discarded;
                miner.run()
            }))
        })
        .collect::<Result<Vec<_>, MinerError>>()?;
    drop(events);

    std::thread::sleep(Duration::from_secs(opts.duration));
    active.store(false, Ordering::Relaxed);

    // Wait for all threads to complete
    for handle in handles {
        handle
            .join()
            .map_err(|_| MinerError::TaskError("Benchmark thread panicked".into()))??;
    }
    // let the reporter drain the final hash counts
    std::thread::sleep(Duration::from_millis(100));

    // Report final results
    let stats = reporter.get_stats();
    log::info!("Benchmark results:");
    log::info!("Total hashes: {}", stats.hashes_total);
    log::info!(
        "Average hashrate: {:.2} H/s",
        stats.hashes_total as f64 / opts.duration.max(1) as f64
    );
    log::logger().flush(); // Ensure final results appear

    Ok(())
}

/// Generates configuration template file
fn generate_config(opts: cli::ConfigOptions) -> Result<(), MinerError> {
    let config = config::generate_template(&opts.node);
    std::fs::write(&opts.output, config)?;
    println!("Wrote configuration template to {}", opts.output.display());
    Ok(())
}
