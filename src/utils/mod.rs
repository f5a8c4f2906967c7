//! Utility modules

pub mod error;

pub use error::{CampaignError, ExecutionError, PoolError, Result, TaskFailure};
