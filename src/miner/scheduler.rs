// src/miner/scheduler.rs
//! Worker pair lifecycle
//!
//! One worker pair per processing unit. A pair is a Listener task and a
//! Miner thread sharing one connection and one handoff; pairs share
//! nothing with each other. A pair ends on the first fatal error of either
//! half and, for transport failures, is rebuilt from scratch with backoff.

use crate::config::Config;
use crate::miner::algorithm::Blake2s;
use crate::miner::handoff::Handoff;
use crate::miner::worker::{Miner, MinerSettings};
use crate::network::listener::{Listener, submit_loop};
use crate::network::node::{self, NodeConfig};
use crate::stats::MinerEvent;
use crate::types::DecodePolicy;
use crate::utils::error::MinerError;
use crossbeam_channel::Sender;
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Everything one worker pair needs; owned by that pair alone
#[derive(Clone)]
pub struct WorkerContext {
    /// Worker index, used in logs
    pub id: usize,
    /// Node to connect to, with timeout and retry policy
    pub node: NodeConfig,
    /// Search loop tunables
    pub settings: MinerSettings,
    /// Handling of malformed inbound messages
    pub on_decode_error: DecodePolicy,
    /// Statistics sink
    pub events: Sender<MinerEvent>,
}

/// Starts and supervises all worker pairs
pub struct Scheduler {
    workers: Vec<WorkerContext>,
}

impl Scheduler {
    /// Builds one worker context per configured thread
    ///
    /// # Errors
    /// Returns `MinerError::ConfigError` if the configuration is invalid.
    pub fn new(config: &Config, events: Sender<MinerEvent>) -> Result<Self, MinerError> {
        let settings = config.miner_settings()?;
        let workers = (0..config.worker_count())
            .map(|id| WorkerContext {
                id,
                node: config.node.clone(),
                settings: settings.clone(),
                on_decode_error: config.on_decode_error,
                events: events.clone(),
            })
            .collect();

        Ok(Scheduler { workers })
    }

    /// Number of worker pairs this scheduler will run
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Runs every worker pair until it terminates
    ///
    /// # Errors
    /// Returns the last worker's error if every worker failed.
    pub async fn run(self) -> Result<(), MinerError> {
        log::info!(
            "Starting {} worker pair(s) against {}",
            self.workers.len(),
            self.workers
                .first()
                .map(|w| w.node.address.as_str())
                .unwrap_or("-")
        );

        let handles: Vec<_> = self
            .workers
            .into_iter()
            .map(|ctx| tokio::spawn(run_worker(ctx)))
            .collect();

        let mut last_error = None;
        let mut succeeded = 0usize;
        for (id, joined) in join_all(handles).await.into_iter().enumerate() {
            match joined.map_err(MinerError::from).and_then(|r| r) {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    log::error!("Worker {} terminated: {}", id, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => Ok(()),
        }
    }
}

/// Runs one worker pair, reconnecting after transport failures
///
/// The reconnect budget applies per outage: every successful connection
/// starts a fresh budget.
///
/// # Errors
/// The first non-retryable error, or the last transport error once the
/// reconnect budget is spent.
pub async fn run_worker(ctx: WorkerContext) -> Result<(), MinerError> {
    let mut attempt = 0u32;
    loop {
        let outcome = match node::connect(&ctx.node.address).await {
            Ok(stream) => {
                attempt = 0;
                log::info!("Worker {}: connected to {}", ctx.id, ctx.node.address);
                run_pair(&ctx, stream).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => return Ok(()),
            Err(e) if e.is_retryable() && attempt < ctx.node.reconnect_attempts => {
                attempt += 1;
                let delay = ctx.node.backoff(attempt);
                log::warn!(
                    "Worker {}: {} (reconnect {}/{} in {:?})",
                    ctx.id,
                    e,
                    attempt,
                    ctx.node.reconnect_attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// One connection's worth of work: mine over `stream` and tear down together
async fn run_pair(ctx: &WorkerContext, stream: TcpStream) -> Result<(), MinerError> {
    let (reader, writer) = stream.into_split();

    let handoff = Arc::new(Handoff::new());
    let active = Arc::new(AtomicBool::new(true));
    let (submissions, submission_rx) = mpsc::unbounded_channel();

    let miner = Miner::new(
        ctx.id,
        Blake2s::new(),
        handoff.clone(),
        submissions,
        active.clone(),
        ctx.settings.clone(),
    )
    .with_events(ctx.events.clone());
    let mut miner_task = tokio::task::spawn_blocking(move || miner.run());

    let listener = Listener::new(ctx.id, reader, handoff)
        .with_decode_policy(ctx.on_decode_error)
        .with_idle_timeout(ctx.node.idle_timeout());

    let (result, miner_done) = tokio::select! {
        r = listener.receive_loop() => (r, None),
        r = submit_loop(writer, submission_rx) => (r, None),
        r = &mut miner_task => (r.map_err(MinerError::from).and_then(|r| r), Some(())),
    };

    active.store(false, Ordering::Relaxed);
    if miner_done.is_none() {
        // the miner exits on its next loop iteration
        miner_task.await??;
    }
    result
}
