//! Run configuration derived from CLI arguments

use std::path::PathBuf;
use std::time::Duration;

use super::campaign_config::CampaignConfig;
use super::cli::{CliArgs, OutputFormat};
use super::plan::CampaignPlan;

/// Everything one invocation of the binary will do
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Campaigns in execution order
    pub campaigns: Vec<CampaignConfig>,
    /// Trials per campaign
    pub trials: u32,

    // Output
    pub output_path: Option<PathBuf>,
    pub csv_output: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
}

impl RunConfig {
    /// Create configuration from CLI arguments (and the plan file, if given)
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        // Validate first
        args.validate()?;

        let threads = args.effective_threads();

        let (mut campaigns, trials) = if let Some(ref path) = args.plan {
            let plan = CampaignPlan::load(path)
                .map_err(|e| format!("Failed to load plan {:?}: {}", path, e))?;
            let trials = plan.trials.unwrap_or(args.trials);
            (plan.expand(threads), trials)
        } else {
            let campaigns = args
                .effective_modes()
                .into_iter()
                .map(|mode| {
                    CampaignConfig::new(args.tasks, args.increments, mode).with_threads(threads)
                })
                .collect();
            (campaigns, args.trials)
        };

        // Progress bars only make sense for single text-mode runs
        let progress = !args.quiet && args.output_format == OutputFormat::Text && trials == 1;
        let timeout = args.timeout_ms.map(Duration::from_millis);

        for campaign in &mut campaigns {
            campaign.await_timeout = timeout;
            campaign.progress = progress;
            campaign.validate().map_err(|e| e.to_string())?;
        }

        Ok(Self {
            campaigns,
            trials,
            output_path: args.output.clone(),
            csv_output: args.csv_output.clone(),
            output_format: args.output_format,
            quiet: args.quiet,
            verbose: args.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::SyncMode;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_from_cli_defaults() {
        let args = CliArgs::parse_from(["test", "-t", "4"]);
        let config = RunConfig::from_cli(&args).unwrap();

        assert_eq!(config.campaigns.len(), 3);
        assert_eq!(config.trials, 1);
        assert!(config
            .campaigns
            .iter()
            .all(|c| c.threads == 4 && c.expected_value() == 1_000_000));
        assert!(config.campaigns.iter().all(|c| c.progress));
    }

    #[test]
    fn test_from_cli_timeout_and_modes() {
        let args = CliArgs::parse_from([
            "test", "--modes", "mutex", "--timeout-ms", "250", "--trials", "3", "-q",
        ]);
        let config = RunConfig::from_cli(&args).unwrap();

        assert_eq!(config.campaigns.len(), 1);
        assert_eq!(config.campaigns[0].mode, SyncMode::Mutex);
        assert_eq!(
            config.campaigns[0].await_timeout,
            Some(Duration::from_millis(250))
        );
        assert!(!config.campaigns[0].progress);
        assert_eq!(config.trials, 3);
    }

    #[test]
    fn test_from_cli_plan() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"trials: 4\ncampaigns:\n  - tasks: 5\n    increments: 6\n    modes: [atomic]\n")
            .unwrap();

        let path = file.path().to_string_lossy().to_string();
        let args = CliArgs::parse_from(["test", "-t", "2", "--plan", path.as_str()]);
        let config = RunConfig::from_cli(&args).unwrap();

        assert_eq!(config.trials, 4);
        assert_eq!(config.campaigns.len(), 1);
        assert_eq!(config.campaigns[0].threads, 2);
        assert_eq!(config.campaigns[0].expected_value(), 30);
    }

    #[test]
    fn test_from_cli_invalid_plan_campaign() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"campaigns:\n  - tasks: 0\n    increments: 6\n").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let args = CliArgs::parse_from(["test", "--plan", path.as_str()]);
        assert!(RunConfig::from_cli(&args).is_err());
    }

    #[test]
    fn test_from_cli_rejects_invalid_args() {
        let args = CliArgs::parse_from(["test", "--trials", "0"]);
        assert!(RunConfig::from_cli(&args).is_err());
    }
}
