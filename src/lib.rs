//! increment-campaign library
//!
//! Fixed-size worker pool plus a harness that reproduces lost updates on a
//! shared counter and removes them with a mutex or an atomic.

pub mod benchmark;
pub mod config;
pub mod metrics;
pub mod pool;
pub mod utils;

pub use benchmark::{run_campaign, run_trials, CampaignResult, Coordinator, SyncMode};
pub use config::CampaignConfig;
pub use pool::WorkerPool;
pub use utils::{CampaignError, Result};
