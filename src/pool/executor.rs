//! Fixed-size worker pool
//!
//! `K` OS threads pull boxed jobs from one FIFO injection queue. The thread
//! count never changes after construction, however many tasks are submitted.
//!
//! # Lifecycle
//! 1. `WorkerPool::new` spawns every worker up front.
//! 2. `submit` pushes a job and returns a [`TaskHandle`]; it only blocks for
//!    the queue lock.
//! 3. `await_all` attaches one [`CompletionBarrier`] to a batch of handles and
//!    sleeps on it until every task has finished.
//! 4. `shutdown` closes the queue, lets the workers drain what is already
//!    queued, then joins them. Only the first call does anything.
//!
//! Task panics are caught on the worker thread and reported through the
//! handle, so a failing task never takes a worker down with it.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use super::barrier::CompletionBarrier;
use super::handle::TaskHandle;
use super::stats::PoolStats;
use crate::utils::{CampaignError, ExecutionError, PoolError, Result, TaskFailure};

/// Failure message for queued tasks dropped by [`WorkerPool::detach`]
pub const DISCARDED_MESSAGE: &str = "discarded unrun when the pool was detached";

/// A queued task plus the way to resolve its handle if it never runs
struct Job {
    run: Box<dyn FnOnce() + Send + 'static>,
    discard: Box<dyn FnOnce() + Send + 'static>,
}

struct QueueState {
    jobs: VecDeque<Job>,
    accepting: bool,
}

/// Queue shared by the pool and its workers
struct Injector {
    state: Mutex<QueueState>,
    job_ready: Condvar,
}

impl Injector {
    fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                accepting: true,
            }),
            job_ready: Condvar::new(),
        }
    }

    /// Enqueue a job, handing it back if the queue is closed
    fn push(&self, job: Job) -> std::result::Result<(), Job> {
        let mut state = self.state.lock();
        if !state.accepting {
            return Err(job);
        }
        state.jobs.push_back(job);
        drop(state);
        self.job_ready.notify_one();
        Ok(())
    }

    /// Next job in FIFO order; `None` once the queue is closed and empty
    fn pop(&self) -> Option<Job> {
        let mut state = self.state.lock();
        loop {
            if let Some(job) = state.jobs.pop_front() {
                return Some(job);
            }
            if !state.accepting {
                return None;
            }
            self.job_ready.wait(&mut state);
        }
    }

    /// Stop accepting jobs. With `discard`, queued jobs are failed unrun.
    fn close(&self, discard: bool) -> usize {
        let mut state = self.state.lock();
        state.accepting = false;
        let dropped: Vec<Job> = if discard {
            state.jobs.drain(..).collect()
        } else {
            Vec::new()
        };
        drop(state);
        self.job_ready.notify_all();

        let count = dropped.len();
        for job in dropped {
            (job.discard)();
        }
        count
    }
}

/// Fixed-size thread pool
pub struct WorkerPool {
    injector: Arc<Injector>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    stats: Arc<PoolStats>,
    thread_count: usize,
    next_task_id: AtomicU64,
    shut_down: AtomicBool,
}

impl WorkerPool {
    /// Create a pool of `thread_count` workers named `pool-worker-<n>`
    pub fn new(thread_count: usize) -> Result<Self> {
        Self::with_name(thread_count, "pool-worker")
    }

    /// Create a pool whose threads are named `<prefix>-<n>`
    pub fn with_name(thread_count: usize, prefix: &str) -> Result<Self> {
        if thread_count < 1 {
            return Err(CampaignError::Config(format!(
                "worker pool needs at least 1 thread, got {}",
                thread_count
            )));
        }

        let injector = Arc::new(Injector::new());
        let stats = Arc::new(PoolStats::new());
        let mut workers = Vec::with_capacity(thread_count);

        for worker_id in 0..thread_count {
            let queue = Arc::clone(&injector);
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", prefix, worker_id))
                .spawn(move || worker_loop(worker_id, &queue));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    // Release the workers that did start before bailing out
                    injector.close(true);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(PoolError::Spawn { worker_id, source }.into());
                }
            }
        }

        debug!("Started worker pool '{}' with {} threads", prefix, thread_count);

        Ok(Self {
            injector,
            workers: Mutex::new(workers),
            stats,
            thread_count,
            next_task_id: AtomicU64::new(0),
            shut_down: AtomicBool::new(false),
        })
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Shared statistics (for progress reporting)
    pub fn stats(&self) -> Arc<PoolStats> {
        Arc::clone(&self.stats)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Enqueue `task` for execution on a pool thread
    pub fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let task_id = self.next_task_id.fetch_add(1, Ordering::Relaxed);
        let (handle, slot) = TaskHandle::new(task_id);
        let stats = Arc::clone(&self.stats);
        let unrun_slot = Arc::clone(&slot);

        let job = Job {
            run: Box::new(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(task))
                    .map_err(|payload| TaskFailure::from_panic(task_id, payload));
                if let Err(ref failure) = outcome {
                    warn!("{}", failure);
                }
                stats.record_outcome(outcome.is_ok());
                slot.complete(outcome);
            }),
            discard: Box::new(move || {
                unrun_slot.complete(Err(TaskFailure {
                    task_id,
                    message: DISCARDED_MESSAGE.to_string(),
                }));
            }),
        };

        self.injector
            .push(job)
            .map_err(|_| CampaignError::Pool(PoolError::ShutDown))?;
        self.stats.record_submitted();

        Ok(handle)
    }

    /// Block until every handle's task has finished
    ///
    /// Returns outputs in handle order. If any task panicked, every failure is
    /// collected into one [`ExecutionError`].
    pub fn await_all<T>(&self, handles: Vec<TaskHandle<T>>) -> Result<Vec<T>> {
        let barrier = Self::attach_barrier(&handles);
        barrier.wait();
        Self::collect(handles)
    }

    /// Like [`await_all`](Self::await_all) but gives up after `timeout`
    ///
    /// On timeout the handles are released and the tasks keep running; the
    /// caller decides whether to `shutdown` (and wait for them) or `detach`.
    pub fn await_all_timeout<T>(
        &self,
        handles: Vec<TaskHandle<T>>,
        timeout: Duration,
    ) -> Result<Vec<T>> {
        let start = Instant::now();
        let barrier = Self::attach_barrier(&handles);

        if !barrier.wait_timeout(timeout) {
            let failures = Self::finished_failures(handles);
            for failure in &failures {
                warn!("Before timeout: {}", failure);
            }
            return Err(PoolError::Timeout {
                pending: barrier.remaining(),
                total: barrier.total(),
                waited_ms: start.elapsed().as_millis() as u64,
                failures,
            }
            .into());
        }

        Self::collect(handles)
    }

    fn attach_barrier<T>(handles: &[TaskHandle<T>]) -> Arc<CompletionBarrier> {
        let barrier = Arc::new(CompletionBarrier::new(handles.len()));
        for handle in handles {
            handle.notify_on_completion(&barrier);
        }
        barrier
    }

    /// Failures of the handles that finished; unfinished ones are released
    fn finished_failures<T>(handles: Vec<TaskHandle<T>>) -> Vec<TaskFailure> {
        let mut failures: Vec<TaskFailure> = handles
            .into_iter()
            .filter(|handle| handle.is_finished())
            .filter_map(|handle| handle.wait().err())
            .collect();
        failures.sort_by_key(|f| f.task_id);
        failures
    }

    /// Drain finished handles; none of these waits block
    fn collect<T>(handles: Vec<TaskHandle<T>>) -> Result<Vec<T>> {
        let total = handles.len();
        let mut outputs = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for handle in handles {
            match handle.wait() {
                Ok(output) => outputs.push(output),
                Err(failure) => failures.push(failure),
            }
        }

        if failures.is_empty() {
            Ok(outputs)
        } else {
            failures.sort_by_key(|f| f.task_id);
            Err(ExecutionError { total, failures }.into())
        }
    }

    /// Stop accepting work, run what is queued, and join every worker
    ///
    /// Idempotent: the first call shuts the pool down and returns
    /// `true`; any later call is a no-op returning `false`. Results already
    /// delivered through handles are unaffected either way.
    pub fn shutdown(&self) -> bool {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            debug!("Worker pool already shut down, ignoring repeated shutdown");
            return false;
        }

        self.injector.close(false);

        let workers = std::mem::take(&mut *self.workers.lock());
        for (worker_id, handle) in workers.into_iter().enumerate() {
            if handle.join().is_err() {
                warn!("Worker {} exited abnormally", worker_id);
            }
        }

        let (completed, submitted) = self.stats.progress();
        debug!(
            "Worker pool shut down: {}/{} tasks completed, {} failed",
            completed,
            submitted,
            self.stats.failures()
        );
        true
    }

    /// Close the pool without joining its threads
    ///
    /// Queued jobs are discarded and running ones are left to finish on their
    /// own. Meant for the aftermath of a timed-out wait, where joining could
    /// hang. Returns false if the pool was already shut down.
    pub fn detach(&self) -> bool {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return false;
        }

        let dropped = self.injector.close(true);
        let workers = std::mem::take(&mut *self.workers.lock());
        warn!(
            "Detached worker pool: {} queued tasks discarded, {} threads left running",
            dropped,
            workers.len()
        );
        drop(workers);
        true
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(worker_id: usize, injector: &Injector) {
    let mut executed = 0u64;
    while let Some(job) = injector.pop() {
        (job.run)();
        executed += 1;
    }
    trace!("Worker {} exiting after {} jobs", worker_id, executed);
}
