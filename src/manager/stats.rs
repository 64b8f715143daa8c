//! Aggregate throughput counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Owned counter state for a manager's lifetime.
///
/// One counter per dispatched attempt plus the start timestamp, enough for
/// the throughput summary emitted on close.
#[derive(Debug)]
pub(crate) struct ManagerStats {
    requests: AtomicU64,
    started: Instant,
}

impl ManagerStats {
    pub(crate) fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Counts one dispatched attempt and returns the running total.
    pub(crate) fn record_request(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn total(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
