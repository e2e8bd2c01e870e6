// src/stats/reporter.rs
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use sysinfo::System;

/// Something a Miner wants counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinerEvent {
    /// This many hash attempts were made since the last report
    Hashes(u64),
    /// A new template replaced the current search
    TemplateAdopted,
    /// A solved block was handed to the connection
    SolutionSubmitted,
    /// A template's counter space ran out before the node replaced it
    CounterExhausted,
}

/// Statistics related to mining performance
#[derive(Debug, Clone, Default)]
pub struct MiningStats {
    /// Total number of hashes computed
    pub hashes_total: u64,
    /// Templates adopted by all miners
    pub templates_adopted: u64,
    /// Solved blocks submitted to the node
    pub solutions_submitted: u64,
    /// Templates whose counter space ran out
    pub counters_exhausted: u64,
    /// Average hashrate since start (hashes per second)
    pub avg_hashrate: f64,
}

/// Statistics related to host load
#[derive(Debug, Clone)]
pub struct HardwareStats {
    /// Current CPU usage percentage (0-100)
    pub cpu_usage: f32,
    /// Memory in use on the host (in bytes)
    pub memory_used: u64,
}

/// Collects miner events and periodically logs a summary
pub struct StatsReporter {
    /// Atomic counters for mining statistics
    stats: Arc<MiningStatsAtomic>,
    /// System information collector
    system: System,
    /// Interval at which stats are reported
    report_interval: Duration,
}

/// Atomic version of MiningStats for thread-safe operations
struct MiningStatsAtomic {
    hashes: AtomicU64,
    templates: AtomicU64,
    solutions: AtomicU64,
    exhausted: AtomicU64,
    start_time: Instant,
}

impl MiningStatsAtomic {
    fn record(&self, event: MinerEvent) {
        match event {
            MinerEvent::Hashes(n) => self.hashes.fetch_add(n, Ordering::Relaxed),
            MinerEvent::TemplateAdopted => self.templates.fetch_add(1, Ordering::Relaxed),
            MinerEvent::SolutionSubmitted => self.solutions.fetch_add(1, Ordering::Relaxed),
            MinerEvent::CounterExhausted => self.exhausted.fetch_add(1, Ordering::Relaxed),
        };
    }
}

impl StatsReporter {
    /// Creates a new StatsReporter with the specified reporting interval
    ///
    /// # Arguments
    /// * `report_interval` - How often to log statistics
    pub fn new(report_interval: Duration) -> Self {
        StatsReporter {
            stats: Arc::new(MiningStatsAtomic {
                hashes: AtomicU64::new(0),
                templates: AtomicU64::new(0),
                solutions: AtomicU64::new(0),
                exhausted: AtomicU64::new(0),
                start_time: Instant::now(),
            }),
            system: System::new(),
            report_interval,
        }
    }

    /// Creates and returns a channel sender for miner events
    ///
    /// The reporter drains the channel on a background thread; the thread
    /// exits once every clone of the sender is dropped.
    pub fn event_sender(&self) -> Sender<MinerEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.start_event_listener(rx);
        tx
    }

    /// Gets the current mining statistics
    pub fn get_stats(&self) -> MiningStats {
        let elapsed = self.stats.start_time.elapsed().as_secs_f64();
        let hashes = self.stats.hashes.load(Ordering::Relaxed);

        MiningStats {
            hashes_total: hashes,
            templates_adopted: self.stats.templates.load(Ordering::Relaxed),
            solutions_submitted: self.stats.solutions.load(Ordering::Relaxed),
            counters_exhausted: self.stats.exhausted.load(Ordering::Relaxed),
            avg_hashrate: if elapsed > 0.0 {
                hashes as f64 / elapsed
            } else {
                0.0
            },
        }
    }

    /// Gets the current hardware statistics
    ///
    /// This refreshes system information before returning the stats.
    pub fn get_hardware_stats(&mut self) -> HardwareStats {
        self.system.refresh_cpu_all();
        self.system.refresh_memory();

        let cpus = self.system.cpus();
        let cpu_usage = if cpus.is_empty() {
            0.0
        } else {
            cpus.iter().map(|c| c.cpu_usage()).sum::<f32>() / cpus.len() as f32
        };

        HardwareStats {
            cpu_usage,
            memory_used: self.system.used_memory(),
        }
    }

    /// Starts the periodic reporting of statistics
    ///
    /// This spawns a background thread that logs stats at the configured interval.
    pub fn start_reporting(&self) {
        let stats = self.stats.clone();
        let interval = self.report_interval;

        std::thread::spawn(move || {
            let mut reporter = StatsReporter {
                stats,
                system: System::new(),
                report_interval: interval,
            };

            let mut last_hashes = 0u64;
            loop {
                std::thread::sleep(interval);
                let mining_stats = reporter.get_stats();
                let hw_stats = reporter.get_hardware_stats();
                let recent = interval_rate(
                    mining_stats.hashes_total.saturating_sub(last_hashes),
                    interval,
                );
                last_hashes = mining_stats.hashes_total;

                log::info!(
                    "Hashrate: {:.2} H/s (avg {:.2}) | Hashes: {} | Templates: {} | Submitted: {} | Exhausted: {} | CPU: {:.1}% | Mem: {} MiB",
                    recent,
                    mining_stats.avg_hashrate,
                    mining_stats.hashes_total,
                    mining_stats.templates_adopted,
                    mining_stats.solutions_submitted,
                    mining_stats.counters_exhausted,
                    hw_stats.cpu_usage,
                    hw_stats.memory_used / (1024 * 1024)
                );
            }
        });
    }

    /// Starts a listener for miner events on a background thread
    fn start_event_listener(&self, receiver: Receiver<MinerEvent>) {
        let stats = self.stats.clone();

        std::thread::spawn(move || {
            for event in receiver {
                stats.record(event);
            }
        });
    }
}

/// Hashes per second over one reporting window
fn interval_rate(hashes: u64, window: Duration) -> f64 {
    let secs = window.as_secs_f64();
    if secs > 0.0 { hashes as f64 / secs } else { 0.0 }
}
