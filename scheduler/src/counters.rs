//! Per-run counters.
//!
//! Updated from concurrently running instrument tasks, read once at the end
//! of the run to log a summary.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Default)]
pub struct RunCounters {
    pub evaluated: Arc<AtomicU64>,
    pub spikes: Arc<AtomicU64>,
    pub quiet: Arc<AtomicU64>,
    pub insufficient: Arc<AtomicU64>,
    pub notify_failures: Arc<AtomicU64>,
    pub failed_tasks: Arc<AtomicU64>,
}

impl RunCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, instruments: usize, batches: usize, rate_limited: u64) -> RunSummary {
        RunSummary {
            instruments,
            batches,
            evaluated: self.evaluated.load(Ordering::Relaxed),
            spikes: self.spikes.load(Ordering::Relaxed),
            quiet: self.quiet.load(Ordering::Relaxed),
            insufficient: self.insufficient.load(Ordering::Relaxed),
            notify_failures: self.notify_failures.load(Ordering::Relaxed),
            failed_tasks: self.failed_tasks.load(Ordering::Relaxed),
            rate_limited,
        }
    }
}

/// Outcome of a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub instruments: usize,
    pub batches: usize,
    pub evaluated: u64,
    pub spikes: u64,
    pub quiet: u64,
    pub insufficient: u64,
    pub notify_failures: u64,
    /// Instrument tasks that panicked or were cancelled.
    pub failed_tasks: u64,
    /// Rate-limit responses seen during the run.
    pub rate_limited: u64,
}
