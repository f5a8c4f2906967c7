//! Result reporting
//!
//! - CampaignReporter: per-campaign stdout output (text, JSON or CSV)
//! - CampaignReport: JSON / CSV export of a whole run

pub mod reporter;

pub use reporter::{CampaignReport, CampaignReporter};
