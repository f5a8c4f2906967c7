//! Repeated trials
//!
//! The unsynchronized mode only shows its race statistically, so a campaign
//! can be repeated with identical parameters and summarized as a whole. Every
//! trial gets a fresh coordinator, counter and pool.

use std::time::Duration;

use tracing::{debug, info};

use super::coordinator::{format_count, CampaignResult, Coordinator};
use super::sync_mode::SyncMode;
use crate::config::CampaignConfig;
use crate::utils::{CampaignError, Result};

/// Summary of a repeated campaign
pub struct TrialSummary {
    pub config: CampaignConfig,
    /// One result per trial, in run order
    pub runs: Vec<CampaignResult>,
}

impl TrialSummary {
    pub fn mode(&self) -> SyncMode {
        self.config.mode
    }

    pub fn trials(&self) -> usize {
        self.runs.len()
    }

    pub fn expected_value(&self) -> u64 {
        self.config.expected_value()
    }

    /// Trials whose final value matched the expected value
    pub fn exact_runs(&self) -> usize {
        self.runs.iter().filter(|r| r.is_exact()).count()
    }

    /// Trials that lost at least one update
    pub fn inexact_runs(&self) -> usize {
        self.trials() - self.exact_runs()
    }

    /// Fraction of trials that lost updates (0.0 to 1.0)
    pub fn inexact_rate(&self) -> f64 {
        if self.runs.is_empty() {
            0.0
        } else {
            self.inexact_runs() as f64 / self.trials() as f64
        }
    }

    pub fn min_final(&self) -> u64 {
        self.runs.iter().map(|r| r.final_value).min().unwrap_or(0)
    }

    pub fn max_final(&self) -> u64 {
        self.runs.iter().map(|r| r.final_value).max().unwrap_or(0)
    }

    pub fn mean_final(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.runs.iter().map(|r| r.final_value as f64).sum::<f64>() / self.trials() as f64
    }

    pub fn total_lost_updates(&self) -> u64 {
        self.runs.iter().map(|r| r.lost_updates()).sum()
    }

    pub fn total_elapsed(&self) -> Duration {
        self.runs.iter().map(|r| r.elapsed).sum()
    }

    /// Print summary (compact format)
    pub fn print_summary(&self) {
        println!(
            "\n=== {} x {} trials ({}) ===",
            self.mode(),
            self.trials(),
            self.config.summary()
        );
        println!(
            "Exact: {}/{} | Final: min={} mean={:.0} max={} | Expected: {}",
            self.exact_runs(),
            self.trials(),
            format_count(self.min_final()),
            self.mean_final(),
            format_count(self.max_final()),
            format_count(self.expected_value())
        );
        if self.inexact_runs() > 0 {
            println!(
                "Lost updates: {} total across {} trials ({:.0}% of trials raced)",
                format_count(self.total_lost_updates()),
                self.inexact_runs(),
                self.inexact_rate() * 100.0
            );
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "mode": self.mode().as_str(),
            "task_count": self.config.task_count,
            "increments_per_task": self.config.increments_per_task,
            "thread_count": self.config.threads,
            "trials": self.trials(),
            "expected_value": self.expected_value(),
            "exact_runs": self.exact_runs(),
            "inexact_runs": self.inexact_runs(),
            "final_value": {
                "min": self.min_final(),
                "mean": self.mean_final(),
                "max": self.max_final()
            },
            "total_lost_updates": self.total_lost_updates(),
            "total_elapsed_ms": self.total_elapsed().as_secs_f64() * 1000.0,
            "runs": self.runs.iter().map(|r| r.to_json()).collect::<Vec<_>>()
        })
    }
}

/// Run `trials` independent campaigns with the same configuration
pub fn run_trials(config: &CampaignConfig, trials: u32) -> Result<TrialSummary> {
    if trials < 1 {
        return Err(CampaignError::Config(format!(
            "trial count must be at least 1, got {}",
            trials
        )));
    }
    config.validate()?;

    info!("Running {} trials: {}", trials, config.summary());

    let mut runs = Vec::with_capacity(trials as usize);
    for trial in 0..trials {
        let mut coordinator = Coordinator::new(config.clone())?;
        let result = coordinator.run()?;
        debug!(
            "Trial {}/{}: final {} (lost {})",
            trial + 1,
            trials,
            result.final_value,
            result.lost_updates()
        );
        runs.push(result);
    }

    Ok(TrialSummary {
        config: config.clone(),
        runs,
    })
}
