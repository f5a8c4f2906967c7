//! Command-line argument parsing

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use super::campaign_config::default_thread_count;
use crate::benchmark::SyncMode;

/// Reproduce and correct lost-update races on a shared counter
#[derive(Parser, Debug, Clone)]
#[command(name = "increment-campaign")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    // ===== Campaign Parameters =====
    /// Number of logical tasks submitted per campaign
    #[arg(short = 'n', long = "tasks", default_value_t = 1000)]
    pub tasks: u64,

    /// Increments performed by each task
    #[arg(short = 'm', long = "increments", default_value_t = 1000)]
    pub increments: u64,

    /// Synchronization modes to run, comma separated (default: all)
    #[arg(long = "modes", value_enum, value_delimiter = ',')]
    pub modes: Option<Vec<SyncMode>>,

    /// Number of pool threads (0 = auto-detect)
    #[arg(short = 't', long = "threads", default_value_t = 0)]
    pub threads: usize,

    /// Repeat each campaign this many times
    #[arg(long = "trials", default_value_t = 1)]
    pub trials: u32,

    /// Give up waiting for tasks after this many milliseconds
    #[arg(long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// YAML campaign plan (overrides --tasks/--increments/--modes)
    #[arg(long = "plan")]
    pub plan: Option<PathBuf>,

    // ===== Output Options =====
    /// Output JSON file path
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output CSV file path (one row per campaign)
    #[arg(long = "csv")]
    pub csv_output: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long = "output-format", value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format for results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.tasks == 0 {
            return Err("--tasks must be at least 1".to_string());
        }

        if self.increments == 0 {
            return Err("--increments must be at least 1".to_string());
        }

        if self.trials == 0 {
            return Err("--trials must be at least 1".to_string());
        }

        if self.timeout_ms == Some(0) {
            return Err("--timeout-ms must be positive".to_string());
        }

        if let Some(ref modes) = self.modes {
            if modes.is_empty() {
                return Err("--modes needs at least one mode".to_string());
            }
        }

        if self.quiet && self.verbose {
            return Err("--quiet and --verbose are mutually exclusive".to_string());
        }

        Ok(())
    }

    /// Get effective number of threads (0 = auto-detect)
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            default_thread_count()
        } else {
            self.threads
        }
    }

    /// Modes to run, all of them unless restricted
    pub fn effective_modes(&self) -> Vec<SyncMode> {
        self.modes
            .clone()
            .unwrap_or_else(|| SyncMode::ALL.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(["test"]);
        assert_eq!(args.tasks, 1000);
        assert_eq!(args.increments, 1000);
        assert_eq!(args.threads, 0);
        assert_eq!(args.trials, 1);
        assert_eq!(args.output_format, OutputFormat::Text);
        assert_eq!(args.effective_modes(), SyncMode::ALL.to_vec());
        assert!(args.effective_threads() >= 2);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_mode_list() {
        let args = CliArgs::parse_from(["test", "--modes", "none,atomic"]);
        assert_eq!(
            args.effective_modes(),
            vec![SyncMode::Unsynchronized, SyncMode::Atomic]
        );
    }

    #[test]
    fn test_campaign_args() {
        let args = CliArgs::parse_from([
            "test", "-n", "50", "-m", "2000", "-t", "3", "--trials", "7", "--timeout-ms", "900",
        ]);
        assert_eq!(args.tasks, 50);
        assert_eq!(args.increments, 2000);
        assert_eq!(args.effective_threads(), 3);
        assert_eq!(args.trials, 7);
        assert_eq!(args.timeout_ms, Some(900));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(CliArgs::try_parse_from(["test", "--modes", "spinlock"]).is_err());
    }

    #[test]
    fn test_validation_zero_tasks() {
        let args = CliArgs::parse_from(["test", "-n", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_increments() {
        let args = CliArgs::parse_from(["test", "-m", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_quiet_and_verbose() {
        let args = CliArgs::parse_from(["test", "-q", "-v"]);
        assert!(args.validate().is_err());
    }
}
