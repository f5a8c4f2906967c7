//! increment-campaign - lost-update race demonstration
//!
//! Runs increment campaigns over a fixed-size worker pool in each
//! synchronization mode and reports how many updates were lost.

use anyhow::Result;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use increment_campaign::benchmark::{format_count, run_trials, TrialSummary};
use increment_campaign::config::{CliArgs, RunConfig};
use increment_campaign::metrics::{CampaignReport, CampaignReporter};

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn print_banner(config: &RunConfig) {
    if config.quiet {
        return;
    }

    println!("increment-campaign v{}", env!("CARGO_PKG_VERSION"));
    println!("====================================");
    for campaign in &config.campaigns {
        println!("Campaign: {}", campaign.summary());
    }
    println!("Trials per campaign: {}", config.trials);
    if let Some(timeout) = config.campaigns.first().and_then(|c| c.await_timeout) {
        println!("Completion timeout: {}ms", timeout.as_millis());
    }
    println!("====================================\n");
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse_args();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    // Build configuration
    let config =
        RunConfig::from_cli(&args).map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    print_banner(&config);

    let mut reporter = CampaignReporter::new(config.output_format);
    let mut summaries: Vec<TrialSummary> = Vec::with_capacity(config.campaigns.len());

    for campaign in &config.campaigns {
        let summary = run_trials(campaign, config.trials)?;
        if !config.quiet {
            reporter.report(&summary)?;
        }
        summaries.push(summary);
    }

    let config_summary = format!(
        "campaigns={}, trials={}",
        config.campaigns.len(),
        config.trials
    );
    let report = CampaignReport::new(&config_summary, &summaries);

    // Export to JSON if requested
    if let Some(ref output_path) = config.output_path {
        info!("Writing results to: {:?}", output_path);
        report.write_json(output_path)?;
    }

    // Export to CSV if requested
    if let Some(ref csv_path) = config.csv_output {
        info!("Writing CSV to: {:?}", csv_path);
        report.write_csv(csv_path)?;
    }

    if !config.quiet {
        println!("\n====================================");
        println!("CAMPAIGNS COMPLETE");
        println!("====================================");
        for summary in &summaries {
            println!(
                "{:<7} exact {}/{} | lost updates: {}",
                summary.mode().as_str(),
                summary.exact_runs(),
                summary.trials(),
                format_count(summary.total_lost_updates())
            );
        }
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
