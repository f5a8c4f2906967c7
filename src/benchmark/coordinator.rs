//! Campaign coordinator
//!
//! Drives one increment campaign: creates the shared counter, fans `N` tasks
//! out over a fresh `K`-thread pool, waits on the pool's completion barrier,
//! shuts the pool down and reports the final counter value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hdrhistogram::Histogram;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::counters::SharedCounter;
use super::sync_mode::SyncMode;
use crate::config::CampaignConfig;
use crate::pool::{PoolStats, WorkerPool};
use crate::utils::{CampaignError, PoolError, Result};

/// Upper bound for per-task wall time (1 hour, in microseconds)
const MAX_TASK_TIME_US: u64 = 3_600_000_000;

/// Cap on the handle buffer reserved up front
const MAX_PREALLOCATED_HANDLES: u64 = 1 << 16;

fn handle_capacity(task_count: u64) -> usize {
    task_count.min(MAX_PREALLOCATED_HANDLES) as usize
}

fn new_task_histogram() -> Histogram<u64> {
    Histogram::new_with_bounds(1, MAX_TASK_TIME_US, 3).expect("Failed to create histogram")
}

/// Coordinator lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignState {
    Created,
    /// Pool started, tasks being submitted
    Running,
    /// All tasks submitted, blocked on the completion barrier
    Awaiting,
    Completed,
    Failed,
}

impl std::fmt::Display for CampaignState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Created => "CREATED",
            Self::Running => "RUNNING",
            Self::Awaiting => "AWAITING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of one campaign
pub struct CampaignResult {
    pub mode: SyncMode,
    pub task_count: u64,
    pub increments_per_task: u64,
    pub thread_count: usize,
    /// Counter value read after the completion barrier
    pub final_value: u64,
    /// task_count × increments_per_task
    pub expected_value: u64,
    /// Submission of the first task to completion of the last
    pub elapsed: Duration,
    /// Per-task wall time in microseconds
    pub task_times: Histogram<u64>,
}

impl CampaignResult {
    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Increments that were overwritten by a concurrent read-modify-write
    pub fn lost_updates(&self) -> u64 {
        self.expected_value.saturating_sub(self.final_value)
    }

    pub fn is_exact(&self) -> bool {
        self.final_value == self.expected_value
    }

    /// Lost updates as a fraction of expected increments (0.0 to 1.0)
    pub fn lost_fraction(&self) -> f64 {
        if self.expected_value == 0 {
            0.0
        } else {
            self.lost_updates() as f64 / self.expected_value as f64
        }
    }

    /// Increments attempted per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.expected_value as f64 / secs
        }
    }

    /// Get percentile task time in microseconds
    pub fn percentile_us(&self, p: f64) -> u64 {
        self.task_times.value_at_percentile(p)
    }

    /// Print summary (compact format)
    pub fn print_summary(&self) {
        println!("\n=== {} ===", self.mode);
        println!(
            "Final: {} | Expected: {} | Lost: {} ({:.2}%){}",
            format_count(self.final_value),
            format_count(self.expected_value),
            format_count(self.lost_updates()),
            self.lost_fraction() * 100.0,
            if self.is_exact() { "" } else { " | RACE DETECTED" }
        );
        println!(
            "Tasks: {} x {} increments on {} threads | Elapsed: {:.2}ms | {} incr/s",
            format_count(self.task_count),
            format_count(self.increments_per_task),
            self.thread_count,
            self.elapsed_millis(),
            format_throughput(self.throughput())
        );
        println!(
            "Task time (ms): avg={:.3} p50={:.3} p99={:.3} max={:.3}",
            self.task_times.mean() / 1000.0,
            self.percentile_us(50.0) as f64 / 1000.0,
            self.percentile_us(99.0) as f64 / 1000.0,
            self.task_times.max() as f64 / 1000.0
        );
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "mode": self.mode.as_str(),
            "task_count": self.task_count,
            "increments_per_task": self.increments_per_task,
            "thread_count": self.thread_count,
            "final_value": self.final_value,
            "expected_value": self.expected_value,
            "lost_updates": self.lost_updates(),
            "elapsed_ms": self.elapsed_millis(),
            "task_time_us": {
                "mean": self.task_times.mean(),
                "p50": self.percentile_us(50.0),
                "p99": self.percentile_us(99.0),
                "max": self.task_times.max()
            }
        })
    }
}

/// Orchestrates a single campaign
pub struct Coordinator {
    config: CampaignConfig,
    state: CampaignState,
}

impl Coordinator {
    /// Validate the configuration; nothing is started yet
    pub fn new(config: CampaignConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: CampaignState::Created,
        })
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    pub fn state(&self) -> CampaignState {
        self.state
    }

    /// Run the campaign. A coordinator runs at most once.
    pub fn run(&mut self) -> Result<CampaignResult> {
        let increments = self.config.increments_per_task;
        self.run_tasks(move |_, counter| counter.increment_n(increments))
    }

    /// Run the campaign with a custom task body (receives the task index)
    pub(crate) fn run_tasks<B>(&mut self, body: B) -> Result<CampaignResult>
    where
        B: Fn(u64, &SharedCounter) + Send + Sync + 'static,
    {
        if self.state != CampaignState::Created {
            return Err(CampaignError::State(format!(
                "coordinator is {}, a campaign can only run once",
                self.state
            )));
        }

        let result = self.execute(body);
        self.state = if result.is_ok() {
            CampaignState::Completed
        } else {
            CampaignState::Failed
        };
        result
    }

    fn execute<B>(&mut self, body: B) -> Result<CampaignResult>
    where
        B: Fn(u64, &SharedCounter) + Send + Sync + 'static,
    {
        let config = self.config.clone();
        info!("Starting campaign: {}", config.summary());

        let pool = WorkerPool::with_name(config.threads, "campaign-worker")?;
        self.state = CampaignState::Running;

        let counter = Arc::new(SharedCounter::new(config.mode));
        let body = Arc::new(body);
        let start = Instant::now();

        let mut handles = Vec::with_capacity(handle_capacity(config.task_count));
        for task_index in 0..config.task_count {
            let counter = Arc::clone(&counter);
            let body = Arc::clone(&body);
            handles.push(pool.submit(move || {
                let task_start = Instant::now();
                (*body)(task_index, counter.as_ref());
                task_start.elapsed()
            })?);
        }

        self.state = CampaignState::Awaiting;

        let progress = config
            .progress
            .then(|| ProgressReporter::spawn(pool.stats(), config.task_count));

        let outcome = match config.await_timeout {
            Some(timeout) => pool.await_all_timeout(handles, timeout),
            None => pool.await_all(handles),
        };
        let elapsed = start.elapsed();

        if let Some(progress) = progress {
            progress.finish();
        }

        match &outcome {
            Err(CampaignError::Pool(PoolError::Timeout { .. })) => {
                // Joining could hang on the unfinished tasks
                pool.detach();
            }
            _ => {
                pool.shutdown();
            }
        }

        let task_durations = outcome?;

        let mut task_times = new_task_histogram();
        for duration in &task_durations {
            task_times.saturating_record((duration.as_micros() as u64).max(1));
        }

        let result = CampaignResult {
            mode: config.mode,
            task_count: config.task_count,
            increments_per_task: config.increments_per_task,
            thread_count: config.threads,
            final_value: counter.value(),
            expected_value: config.expected_value(),
            elapsed,
            task_times,
        };

        if result.is_exact() {
            info!(
                "Campaign {} finished: {} in {:.2}ms",
                result.mode,
                format_count(result.final_value),
                result.elapsed_millis()
            );
        } else {
            warn!(
                "Campaign {} lost {} updates: final {} expected {}",
                result.mode,
                format_count(result.lost_updates()),
                format_count(result.final_value),
                format_count(result.expected_value)
            );
        }

        Ok(result)
    }
}

/// Run one campaign with the default thread count
pub fn run_campaign(
    task_count: u64,
    increments_per_task: u64,
    mode: SyncMode,
) -> Result<CampaignResult> {
    let mut coordinator =
        Coordinator::new(CampaignConfig::new(task_count, increments_per_task, mode))?;
    coordinator.run()
}

/// Progress bar fed from pool statistics on a side thread
struct ProgressReporter {
    done: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    fn spawn(stats: Arc<PoolStats>, total: u64) -> Self {
        let done = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&done);
        let handle = thread::spawn(move || Self::report(&stats, total, &stop));
        Self { done, handle }
    }

    fn report(stats: &PoolStats, total: u64, stop: &AtomicBool) {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tasks ({msg})")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);

        let mut last_finished = 0u64;
        let mut last_time = Instant::now();

        loop {
            let (finished, _) = stats.progress();
            pb.set_position(finished);

            let now = Instant::now();
            let interval = now.duration_since(last_time).as_secs_f64();
            if interval >= 0.5 {
                let rate = (finished - last_finished) as f64 / interval;
                pb.set_message(format!("{} tasks/s", format_count(rate as u64)));
                last_finished = finished;
                last_time = now;
            }

            if finished >= total || stop.load(Ordering::Relaxed) {
                break;
            }

            thread::sleep(Duration::from_millis(100));
        }

        pb.finish_with_message(format!("{} failed", stats.failures()));
    }

    fn finish(self) {
        self.done.store(true, Ordering::Relaxed);
        let _ = self.handle.join();
    }
}

/// Format throughput without meaningless decimals
pub fn format_throughput(throughput: f64) -> String {
    format_count(throughput as u64)
}

/// Format large numbers with thousands separators
/// Examples: 1,234,567 or 987,654
pub fn format_count(value: u64) -> String {
    let s = value.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}
