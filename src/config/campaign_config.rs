//! Parameters of a single campaign

use std::time::Duration;

use crate::benchmark::SyncMode;
use crate::utils::{CampaignError, Result};

/// Thread count used when none is configured
///
/// Derived from the machine, never from the task count: the experiment is
/// many logical tasks on few threads. At least 2 so tasks can interleave.
pub fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
        .max(2)
}

/// Complete configuration of one campaign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignConfig {
    /// Logical tasks submitted to the pool (N)
    pub task_count: u64,
    /// Increments performed by each task (M)
    pub increments_per_task: u64,
    pub mode: SyncMode,
    /// Pool threads (K)
    pub threads: usize,
    /// Bound on the completion wait (None = wait forever)
    pub await_timeout: Option<Duration>,
    /// Show a progress bar while tasks run
    pub progress: bool,
}

impl CampaignConfig {
    /// Campaign with the default thread count, no timeout and no progress bar
    pub fn new(task_count: u64, increments_per_task: u64, mode: SyncMode) -> Self {
        Self {
            task_count,
            increments_per_task,
            mode,
            threads: default_thread_count(),
            await_timeout: None,
            progress: false,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.await_timeout = Some(timeout);
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Same parameters under a different mode
    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reject non-positive counts and products that do not fit the counter
    pub fn validate(&self) -> Result<()> {
        if self.task_count < 1 {
            return Err(CampaignError::Config(format!(
                "task count must be at least 1, got {}",
                self.task_count
            )));
        }
        if self.increments_per_task < 1 {
            return Err(CampaignError::Config(format!(
                "increments per task must be at least 1, got {}",
                self.increments_per_task
            )));
        }
        if self.threads < 1 {
            return Err(CampaignError::Config(format!(
                "thread count must be at least 1, got {}",
                self.threads
            )));
        }
        if self.task_count > usize::MAX as u64 {
            return Err(CampaignError::Config(format!(
                "task count {} exceeds addressable handles",
                self.task_count
            )));
        }
        self.checked_expected_value().ok_or_else(|| {
            CampaignError::Config(format!(
                "{} tasks x {} increments overflows the counter",
                self.task_count, self.increments_per_task
            ))
        })?;
        Ok(())
    }

    fn checked_expected_value(&self) -> Option<u64> {
        self.task_count.checked_mul(self.increments_per_task)
    }

    /// Final value a correctly synchronized campaign must reach
    pub fn expected_value(&self) -> u64 {
        self.checked_expected_value().unwrap_or(u64::MAX)
    }

    /// One-line description for banners and reports
    pub fn summary(&self) -> String {
        format!(
            "mode={} tasks={} increments={} threads={}",
            self.mode, self.task_count, self.increments_per_task, self.threads
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CampaignConfig::new(1000, 1000, SyncMode::Mutex);
        assert!(config.threads >= 2);
        assert_eq!(config.await_timeout, None);
        assert!(!config.progress);
        assert_eq!(config.expected_value(), 1_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_threads_independent_of_tasks() {
        let small = CampaignConfig::new(1, 1, SyncMode::Atomic);
        let large = CampaignConfig::new(100_000, 1, SyncMode::Atomic);
        assert_eq!(small.threads, large.threads);
    }

    #[test]
    fn test_validation_rejects_zero_counts() {
        let zero_tasks = CampaignConfig::new(0, 10, SyncMode::Mutex);
        assert!(matches!(
            zero_tasks.validate(),
            Err(CampaignError::Config(_))
        ));

        let zero_increments = CampaignConfig::new(10, 0, SyncMode::Mutex);
        assert!(matches!(
            zero_increments.validate(),
            Err(CampaignError::Config(_))
        ));

        let zero_threads = CampaignConfig::new(10, 10, SyncMode::Mutex).with_threads(0);
        assert!(matches!(
            zero_threads.validate(),
            Err(CampaignError::Config(_))
        ));
    }

    #[test]
    fn test_validation_rejects_overflow() {
        let config = CampaignConfig::new(u64::MAX / 2, 3, SyncMode::Atomic);
        assert!(matches!(config.validate(), Err(CampaignError::Config(_))));
    }

    #[test]
    fn test_builders() {
        let config = CampaignConfig::new(5, 6, SyncMode::Unsynchronized)
            .with_threads(3)
            .with_timeout(Duration::from_secs(2))
            .with_progress(true)
            .with_mode(SyncMode::Atomic);
        assert_eq!(config.threads, 3);
        assert_eq!(config.await_timeout, Some(Duration::from_secs(2)));
        assert!(config.progress);
        assert_eq!(config.mode, SyncMode::Atomic);
        assert_eq!(config.summary(), "mode=ATOMIC tasks=5 increments=6 threads=3");
    }
}
