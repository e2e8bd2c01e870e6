// src/miner/worker.rs
//! Miner: the nonce-search loop of one worker pair
//!
//! The loop never blocks while it has work. Every `poll_every` hash attempts
//! it checks the handoff without waiting; a new template replaces the current
//! candidate immediately, even mid-search. Hits are written to the
//! submission channel feeding the connection's writer.

use crate::miner::algorithm::Algorithm;
use crate::miner::candidate::Candidate;
use crate::miner::handoff::Handoff;
use crate::miner::target::{Target, digest_hex};
use crate::stats::MinerEvent;
use crate::types::{Block, SolvePolicy};
use crate::utils::error::MinerError;
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Hash attempts between hash-count reports to the stats reporter
const STATS_BATCH: u64 = 1 << 16;

/// Tunables of the search loop
#[derive(Debug, Clone)]
pub struct MinerSettings {
    /// Threshold a digest must fall below
    pub target: Target,
    /// Hash attempts between handoff polls (at least 1)
    pub poll_every: u64,
    /// Hash attempts between progress log lines (0 disables them)
    pub progress_interval: u64,
    /// Behaviour after a successful submission
    pub after_solve: SolvePolicy,
    /// Sleep between polls while there is nothing to hash
    pub idle_wait: Duration,
}

impl Default for MinerSettings {
    fn default() -> Self {
        MinerSettings {
            target: Target::default(),
            poll_every: 1,
            progress_interval: 10_000_000,
            after_solve: SolvePolicy::default(),
            idle_wait: Duration::from_millis(1),
        }
    }
}

/// Outcome of a single loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No template to work on; nothing was hashed
    Idle,
    /// One attempt, digest above target
    Missed,
    /// One attempt, digest below target, block submitted
    Solved,
    /// One attempt, digest above target, and the counter space is used up
    Exhausted,
}

enum SearchState {
    /// No template received yet
    AwaitingTemplate,
    Searching(Candidate),
    /// Solved (under `AwaitTemplate`) or exhausted; waiting for a new template
    Parked,
}

/// Nonce searcher owned by one worker pair
pub struct Miner<A: Algorithm> {
    id: usize,
    algorithm: A,
    handoff: Arc<Handoff<Block>>,
    submissions: UnboundedSender<Vec<u8>>,
    events: Sender<MinerEvent>,
    active: Arc<AtomicBool>,
    settings: MinerSettings,
    state: SearchState,
    hashes: u64,
    unreported: u64,
    since_poll: u64,
}

impl<A: Algorithm> Miner<A> {
    /// Creates a Miner in the awaiting-template state
    ///
    /// # Arguments
    /// * `id` - Worker index, used in logs
    /// * `algorithm` - Proof-of-work hash function
    /// * `handoff` - Slot the paired Listener publishes templates into
    /// * `submissions` - Channel to the connection writer
    /// * `active` - Cleared by the worker pair to stop [`Miner::run`]
    /// * `settings` - Loop tunables
    pub fn new(
        id: usize,
        algorithm: A,
        handoff: Arc<Handoff<Block>>,
        submissions: UnboundedSender<Vec<u8>>,
        active: Arc<AtomicBool>,
        settings: MinerSettings,
    ) -> Self {
        // events go nowhere until a reporter is attached
        let (events, _) = crossbeam_channel::unbounded();
        Miner {
            id,
            algorithm,
            handoff,
            submissions,
            events,
            active,
            settings,
            state: SearchState::AwaitingTemplate,
            hashes: 0,
            unreported: 0,
            since_poll: 0,
        }
    }

    /// Routes statistics events to a reporter
    pub fn with_events(mut self, events: Sender<MinerEvent>) -> Self {
        self.events = events;
        self
    }

    /// Runs the search loop until `active` is cleared
    ///
    /// # Errors
    /// Returns `MinerError::ConnectionError` if a solution cannot be handed
    /// to the connection writer; the worker pair treats this as fatal.
    pub fn run(mut self) -> Result<(), MinerError> {
        log::debug!(
            "Worker {}: miner started ({}, target {})",
            self.id,
            self.algorithm.name(),
            self.settings.target
        );

        let result = loop {
            if !self.active.load(Ordering::Relaxed) {
                break Ok(());
            }
            match self.step() {
                Ok(Step::Idle) => std::thread::sleep(self.settings.idle_wait),
                Ok(_) => {}
                Err(e) => break Err(e),
            }
        };

        self.flush_hashes();
        log::debug!("Worker {}: miner stopped after {} hashes", self.id, self.hashes);
        result
    }

    /// Performs one iteration: maybe poll the handoff, then one hash attempt
    pub fn step(&mut self) -> Result<Step, MinerError> {
        let searching = matches!(self.state, SearchState::Searching(_));
        if !searching || self.since_poll >= self.settings.poll_every {
            self.since_poll = 0;
            self.poll_handoff();
        }

        let SearchState::Searching(candidate) = &mut self.state else {
            return Ok(Step::Idle);
        };

        let digest = self.algorithm.digest(candidate.bytes());
        self.hashes += 1;
        self.unreported += 1;
        self.since_poll += 1;

        if self.settings.progress_interval > 0
            && self.hashes % self.settings.progress_interval == 0
        {
            log::info!(
                "Worker {}: {} hashes, nonce {}",
                self.id,
                self.hashes,
                candidate.nonce()
            );
        }

        let solved = self.settings.target.is_met_by(&digest);
        if solved {
            let mut frame = Vec::with_capacity(candidate.bytes().len() + 1);
            frame.extend_from_slice(candidate.bytes());
            frame.push(b'\n');
            self.submissions.send(frame).map_err(|_| {
                MinerError::ConnectionError(format!(
                    "Worker {}: connection writer is gone",
                    self.id
                ))
            })?;
            log::info!(
                "Worker {}: submitted block with nonce {} (hash {})",
                self.id,
                candidate.nonce(),
                digest_hex(&digest)
            );
            let _ = self.events.send(MinerEvent::SolutionSubmitted);
        }

        let park_after_solve = solved && self.settings.after_solve == SolvePolicy::AwaitTemplate;
        let exhausted = if park_after_solve {
            false
        } else {
            match candidate.advance() {
                Ok(()) => false,
                Err(MinerError::CounterExhausted { prefix }) => {
                    log::warn!(
                        "Worker {}: counter exhausted for prefix {}, waiting for a new template",
                        self.id,
                        prefix
                    );
                    let _ = self.events.send(MinerEvent::CounterExhausted);
                    true
                }
                Err(e) => return Err(e),
            }
        };

        if park_after_solve || exhausted {
            self.state = SearchState::Parked;
        }
        if self.unreported >= STATS_BATCH {
            self.flush_hashes();
        }

        Ok(if solved {
            Step::Solved
        } else if exhausted {
            Step::Exhausted
        } else {
            Step::Missed
        })
    }

    /// Candidate currently being searched, if any
    pub fn candidate(&self) -> Option<&Candidate> {
        match &self.state {
            SearchState::Searching(candidate) => Some(candidate),
            _ => None,
        }
    }

    /// Whether the Miner is parked after a solve or exhaustion
    pub fn is_parked(&self) -> bool {
        matches!(self.state, SearchState::Parked)
    }

    /// Total hash attempts so far
    pub fn hashes(&self) -> u64 {
        self.hashes
    }

    fn poll_handoff(&mut self) {
        let Some(block) = self.handoff.take_owned() else {
            return;
        };

        match Candidate::new(block) {
            Ok(candidate) => {
                log::debug!(
                    "Worker {}: adopted template, prefix {} counter {:#x}",
                    self.id,
                    candidate.prefix(),
                    candidate.counter()
                );
                self.state = SearchState::Searching(candidate);
                let _ = self.events.send(MinerEvent::TemplateAdopted);
            }
            Err(e) => log::warn!("Worker {}: ignoring unusable template: {}", self.id, e),
        }
    }

    fn flush_hashes(&mut self) {
        if self.unreported > 0 {
            let _ = self.events.send(MinerEvent::Hashes(self.unreported));
            self.unreported = 0;
        }
    }
}
