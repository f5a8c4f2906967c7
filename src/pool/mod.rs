//! Worker pool executor
//!
//! - WorkerPool: fixed set of OS threads fed by a FIFO queue
//! - TaskHandle: per-task completion slot returned by `submit`
//! - CompletionBarrier: countdown latch used by `await_all`
//! - PoolStats: atomic progress counters

pub mod barrier;
pub mod executor;
pub mod handle;
pub mod stats;

pub use barrier::CompletionBarrier;
pub use executor::{WorkerPool, DISCARDED_MESSAGE};
pub use handle::TaskHandle;
pub use stats::PoolStats;
