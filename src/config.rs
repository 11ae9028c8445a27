use crate::classify::ClassifierRules;
use crate::columns::ColumnConfig;
use crate::error::{PipelineError, Result};
use crate::metrics::{PlanningWindows, ReadinessThresholds};
use crate::schedule::ScheduleOffsets;
use crate::types::BuildingDefaults;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "inspection_config.json";

/// Everything tunable about a pipeline run. Every section falls back to
/// its defaults when omitted from the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub columns: ColumnConfig,
    pub rules: ClassifierRules,
    pub readiness: ReadinessThresholds,
    pub schedule: ScheduleOffsets,
    pub windows: PlanningWindows,
    pub building: BuildingDefaults,
}

impl PipelineConfig {
    /// Load from a JSON file; a missing file means defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let r = &self.readiness;
        if !(r.ready < r.minor && r.minor < r.major) {
            return Err(PipelineError::Config(format!(
                "readiness thresholds must increase: {} < {} < {}",
                r.ready, r.minor, r.major
            )));
        }
        if self.windows.near_days > self.windows.far_days {
            return Err(PipelineError::Config(format!(
                "planning window near_days ({}) exceeds far_days ({})",
                self.windows.near_days, self.windows.far_days
            )));
        }
        if self.columns.section_prefix.is_empty() {
            return Err(PipelineError::Config("section_prefix must not be empty".into()));
        }
        Ok(())
    }
}
