//! Error types for increment-campaign

use std::any::Any;
use std::io;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Invalid state: {0}")]
    State(String),

    #[error("Plan error: {0}")]
    Plan(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Worker pool errors
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Worker pool is shut down, submission rejected")]
    ShutDown,

    #[error("Failed to spawn worker thread {worker_id}: {source}")]
    Spawn { worker_id: usize, source: io::Error },

    #[error(
        "Timed out after {waited_ms}ms with {pending} of {total} tasks unfinished ({failed} failed)",
        failed = .failures.len()
    )]
    Timeout {
        pending: usize,
        total: usize,
        waited_ms: u64,
        /// Tasks that had already panicked when the wait gave up
        failures: Vec<TaskFailure>,
    },
}

/// A task that panicked on a pool thread or was discarded before running
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("task {task_id} failed: {message}")]
pub struct TaskFailure {
    pub task_id: u64,
    pub message: String,
}

impl TaskFailure {
    /// Build a failure from a `catch_unwind` payload
    pub fn from_panic(task_id: u64, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { task_id, message }
    }
}

/// Every task failure observed while awaiting a batch of handles
#[derive(Error, Debug)]
#[error("{} of {} tasks failed, first: {}", .failures.len(), .total, first_failure(.failures))]
pub struct ExecutionError {
    /// Number of tasks that were awaited
    pub total: usize,
    /// Failures ordered by task id
    pub failures: Vec<TaskFailure>,
}

fn first_failure(failures: &[TaskFailure]) -> String {
    failures
        .first()
        .map(|f| f.to_string())
        .unwrap_or_else(|| "none".to_string())
}

pub type Result<T> = std::result::Result<T, CampaignError>;
