//! Configuration module

pub mod campaign_config;
pub mod cli;
pub mod plan;
pub mod run_config;

pub use campaign_config::{default_thread_count, CampaignConfig};
pub use cli::{CliArgs, OutputFormat};
pub use plan::{CampaignPlan, PlanEntry};
pub use run_config::RunConfig;
