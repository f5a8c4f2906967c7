//! Sweep the unsynchronized campaign across pool sizes
//!
//! Usage: thread-sweep [max_threads] [tasks] [increments] [trials]
//!
//! Runs the racy mode with 1..=max_threads pool threads and prints how often
//! and how badly updates were lost. One thread never loses an update.

use std::env;
use std::time::Duration;

use increment_campaign::benchmark::{format_count, run_trials, SyncMode};
use increment_campaign::config::{default_thread_count, CampaignConfig};

fn arg_or<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> Result<T, String> {
    match args.get(index) {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("invalid argument {}: {:?}", index, raw)),
        None => Ok(default),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let max_threads: usize = arg_or(&args, 1, default_thread_count())?;
    let tasks: u64 = arg_or(&args, 2, 1000)?;
    let increments: u64 = arg_or(&args, 3, 1000)?;
    let trials: u32 = arg_or(&args, 4, 5)?;

    println!(
        "Sweeping NONE mode: tasks={} increments={} trials={} threads=1..={}",
        tasks, increments, trials, max_threads
    );
    println!(
        "{:>8} {:>10} {:>14} {:>14} {:>10}",
        "Threads", "Raced", "Mean final", "Lost (total)", "Lost %"
    );
    println!("{}", "-".repeat(60));

    for threads in 1..=max_threads.max(1) {
        let config = CampaignConfig::new(tasks, increments, SyncMode::Unsynchronized)
            .with_threads(threads)
            .with_timeout(Duration::from_secs(600));
        let summary = run_trials(&config, trials)?;

        let attempted = summary.expected_value() as f64 * summary.trials() as f64;
        let lost_pct = if attempted > 0.0 {
            summary.total_lost_updates() as f64 / attempted * 100.0
        } else {
            0.0
        };

        println!(
            "{:>8} {:>10} {:>14.0} {:>14} {:>9.2}%",
            threads,
            format!("{}/{}", summary.inexact_runs(), summary.trials()),
            summary.mean_final(),
            format_count(summary.total_lost_updates()),
            lost_pct
        );
    }

    Ok(())
}
