//! YAML campaign plans
//!
//! A plan lists several campaigns to run back to back:
//!
//! ```yaml
//! threads: 4
//! trials: 5
//! campaigns:
//!   - tasks: 1000
//!     increments: 1000
//!     modes: [none, mutex, atomic]
//!   - tasks: 10
//!     increments: 100000
//!     modes: [none]
//!     threads: 8
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::campaign_config::CampaignConfig;
use crate::benchmark::SyncMode;
use crate::utils::{CampaignError, Result};

fn all_modes() -> Vec<SyncMode> {
    SyncMode::ALL.to_vec()
}

/// One plan entry; expands to one campaign per mode
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanEntry {
    pub tasks: u64,
    pub increments: u64,
    #[serde(default = "all_modes")]
    pub modes: Vec<SyncMode>,
    /// Overrides the plan-wide thread count
    pub threads: Option<usize>,
}

/// Parsed campaign plan
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignPlan {
    /// Default thread count for every entry
    pub threads: Option<usize>,
    /// Trials per campaign (overrides the CLI value)
    pub trials: Option<u32>,
    pub campaigns: Vec<PlanEntry>,
}

impl CampaignPlan {
    /// Parse and check a plan
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let plan: CampaignPlan =
            serde_yaml::from_str(yaml).map_err(|e| CampaignError::Plan(e.to_string()))?;

        if plan.campaigns.is_empty() {
            return Err(CampaignError::Plan(
                "plan must list at least one campaign".to_string(),
            ));
        }
        if plan.trials == Some(0) {
            return Err(CampaignError::Plan("trials must be at least 1".to_string()));
        }
        if let Some(i) = plan.campaigns.iter().position(|c| c.modes.is_empty()) {
            return Err(CampaignError::Plan(format!(
                "campaign {} has an empty mode list",
                i
            )));
        }

        Ok(plan)
    }

    /// Load a plan from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Flatten into campaign configs, in plan order then mode order
    pub fn expand(&self, default_threads: usize) -> Vec<CampaignConfig> {
        let plan_threads = self.threads.unwrap_or(default_threads);

        self.campaigns
            .iter()
            .flat_map(|entry| {
                let threads = entry.threads.unwrap_or(plan_threads);
                entry.modes.iter().map(move |&mode| {
                    CampaignConfig::new(entry.tasks, entry.increments, mode).with_threads(threads)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PLAN: &str = r#"
threads: 4
trials: 5
campaigns:
  - tasks: 1000
    increments: 1000
    modes: [none, mutex, atomic]
  - tasks: 10
    increments: 100000
    modes: [none]
    threads: 8
"#;

    #[test]
    fn test_parse_plan() {
        let plan = CampaignPlan::from_yaml(PLAN).unwrap();
        assert_eq!(plan.threads, Some(4));
        assert_eq!(plan.trials, Some(5));
        assert_eq!(plan.campaigns.len(), 2);
        assert_eq!(plan.campaigns[1].threads, Some(8));
    }

    #[test]
    fn test_expand_plan() {
        let plan = CampaignPlan::from_yaml(PLAN).unwrap();
        let configs = plan.expand(2);

        assert_eq!(configs.len(), 4);
        assert_eq!(configs[0].mode, SyncMode::Unsynchronized);
        assert_eq!(configs[1].mode, SyncMode::Mutex);
        assert_eq!(configs[2].mode, SyncMode::Atomic);
        assert!(configs[..3].iter().all(|c| c.threads == 4));
        assert_eq!(configs[3].threads, 8);
        assert_eq!(configs[3].expected_value(), 1_000_000);
    }

    #[test]
    fn test_modes_default_to_all() {
        let plan = CampaignPlan::from_yaml("campaigns:\n  - tasks: 2\n    increments: 3\n").unwrap();
        let configs = plan.expand(6);
        assert_eq!(configs.len(), 3);
        assert!(configs.iter().all(|c| c.threads == 6));
    }

    #[test]
    fn test_rejects_empty_plan() {
        let err = CampaignPlan::from_yaml("campaigns: []").unwrap_err();
        assert!(matches!(err, CampaignError::Plan(_)));
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = CampaignPlan::from_yaml(
            "campaigns:\n  - tasks: 2\n    increments: 3\n    workers: 9\n",
        )
        .unwrap_err();
        assert!(matches!(err, CampaignError::Plan(_)));
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let err = CampaignPlan::from_yaml(
            "campaigns:\n  - tasks: 2\n    increments: 3\n    modes: [spinlock]\n",
        )
        .unwrap_err();
        assert!(matches!(err, CampaignError::Plan(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PLAN.as_bytes()).unwrap();

        let plan = CampaignPlan::load(file.path()).unwrap();
        assert_eq!(plan.campaigns.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = CampaignPlan::load(Path::new("/nonexistent/plan.yaml")).unwrap_err();
        assert!(matches!(err, CampaignError::Io(_)));
    }
}
