//! Increment campaigns
//!
//! This module provides the race-condition experiment built on the worker pool:
//! - SharedCounter: the single contended counter, in one of three sync modes
//! - Coordinator: runs one campaign and produces a CampaignResult
//! - run_trials: repeats a campaign to observe the race statistically

pub mod coordinator;
pub mod counters;
pub mod sync_mode;
pub mod trials;

pub use coordinator::{
    format_count, format_throughput, run_campaign, CampaignResult, CampaignState, Coordinator,
};
pub use counters::SharedCounter;
pub use sync_mode::SyncMode;
pub use trials::{run_trials, TrialSummary};
