//! Campaign reporter - output formatting and export
//!
//! Supports multiple output formats:
//! - Console (human-readable)
//! - JSON
//! - CSV

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::benchmark::TrialSummary;
use crate::config::OutputFormat;

const CSV_HEADER: &str = "mode,tasks,increments,threads,trials,expected,exact_runs,min_final,mean_final,max_final,total_lost,total_elapsed_ms";

fn to_pretty(value: &serde_json::Value) -> io::Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

fn csv_row(summary: &TrialSummary) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{:.1},{},{},{:.3}",
        summary.mode(),
        summary.config.task_count,
        summary.config.increments_per_task,
        summary.config.threads,
        summary.trials(),
        summary.expected_value(),
        summary.exact_runs(),
        summary.min_final(),
        summary.mean_final(),
        summary.max_final(),
        summary.total_lost_updates(),
        summary.total_elapsed().as_secs_f64() * 1000.0
    )
}

/// Writes campaign summaries to stdout
pub struct CampaignReporter {
    format: OutputFormat,
    csv_header_written: bool,
}

impl CampaignReporter {
    /// Create new reporter with specified format
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            csv_header_written: false,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Report one (possibly repeated) campaign
    pub fn report(&mut self, summary: &TrialSummary) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                if summary.trials() == 1 {
                    summary.runs[0].print_summary();
                } else {
                    summary.print_summary();
                }
            }
            OutputFormat::Json => println!("{}", to_pretty(&summary.to_json())?),
            OutputFormat::Csv => {
                if !self.csv_header_written {
                    println!("{}", CSV_HEADER);
                    self.csv_header_written = true;
                }
                println!("{}", csv_row(summary));
            }
        }
        Ok(())
    }
}

/// Collection of campaign summaries for export
pub struct CampaignReport<'a> {
    pub config_summary: String,
    pub campaigns: &'a [TrialSummary],
}

impl<'a> CampaignReport<'a> {
    pub fn new(config_summary: &str, campaigns: &'a [TrialSummary]) -> Self {
        Self {
            config_summary: config_summary.to_string(),
            campaigns,
        }
    }

    /// Export all results to JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "config": self.config_summary,
            "campaigns": self.campaigns.iter().map(|c| c.to_json()).collect::<Vec<_>>()
        })
    }

    /// Write all results to a JSON file
    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "{}", to_pretty(&self.to_json())?)?;
        Ok(())
    }

    /// Write one CSV row per campaign
    pub fn write_csv(&self, path: &Path) -> io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "{}", CSV_HEADER)?;
        for summary in self.campaigns {
            writeln!(file, "{}", csv_row(summary))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::{run_trials, SyncMode};
    use crate::config::CampaignConfig;
    use std::fs;
    use std::time::Duration;

    fn summaries() -> Vec<TrialSummary> {
        [SyncMode::Mutex, SyncMode::Atomic]
            .into_iter()
            .map(|mode| {
                let config = CampaignConfig::new(10, 100, mode)
                    .with_threads(2)
                    .with_timeout(Duration::from_secs(60));
                run_trials(&config, 2).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_output_format() {
        let reporter = CampaignReporter::new(OutputFormat::Json);
        assert_eq!(reporter.format(), OutputFormat::Json);
    }

    #[test]
    fn test_csv_row() {
        let summaries = summaries();
        let row = csv_row(&summaries[0]);
        assert!(row.starts_with("MUTEX,10,100,2,2,1000,2,1000,1000.0,1000,0,"));
        assert_eq!(row.split(',').count(), CSV_HEADER.split(',').count());
    }

    #[test]
    fn test_write_json() {
        let summaries = summaries();
        let report = CampaignReport::new("tasks=10 increments=100", &summaries);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.write_json(&path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["config"], "tasks=10 increments=100");
        assert_eq!(parsed["campaigns"].as_array().map(|a| a.len()), Some(2));
        assert_eq!(parsed["campaigns"][1]["mode"], "ATOMIC");
    }

    #[test]
    fn test_write_csv() {
        let summaries = summaries();
        let report = CampaignReport::new("csv", &summaries);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        report.write_csv(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[2].starts_with("ATOMIC,"));
    }
}
