//! Pool statistics
//!
//! Atomic counters updated by pool threads and read by progress reporters.
//! Relaxed ordering throughout: these are observational only and never used
//! to decide when a task's effects are visible.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the pool and its worker threads
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Tasks accepted by `submit`
    submitted: AtomicU64,

    /// Tasks that ran to completion (including panicked ones)
    completed: AtomicU64,

    /// Tasks that panicked
    failed: AtomicU64,
}

impl PoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished task
    #[inline]
    pub fn record_outcome(&self, succeeded: bool) {
        if !succeeded {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current progress as (completed, submitted)
    pub fn progress(&self) -> (u64, u64) {
        (
            self.completed.load(Ordering::Relaxed),
            self.submitted.load(Ordering::Relaxed),
        )
    }

    pub fn failures(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Tasks submitted but not yet finished (queued or running)
    pub fn in_flight(&self) -> u64 {
        let (completed, submitted) = self.progress();
        submitted.saturating_sub(completed)
    }
}
