//! Dashboard configuration
//!
//! A JSON document naming the vitals and scores sources plus the calorie and
//! comparison settings. Every field is optional; Sheets credentials are never
//! part of the file and come from the environment (see [`SheetsAuth::from_env`]).
//!
//! ```json
//! {
//!   "vitals": { "kind": "sheets", "spreadsheet_id": "1AbC...", "range": "Sheet2" },
//!   "scores": { "kind": "csv", "path": "scores.csv" },
//!   "calories": { "body_weight_kg": 82.0 },
//!   "comparison_mode": "mean_value"
//! }
//! ```

use crate::calories::CalorieParams;
use crate::error::ComputeError;
use crate::source::{CsvSource, SheetsAuth, SheetsSource, SourceHandle};
use crate::types::{ComparisonMode, SummaryMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Range holding the vitals table
pub const DEFAULT_VITALS_RANGE: &str = "Sheet2";

/// Range holding the game score log
pub const DEFAULT_SCORES_RANGE: &str = "Sheet2!A1:C";

/// Where one dataset is read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Sheets {
        spreadsheet_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<String>,
    },
    Csv {
        path: PathBuf,
    },
}

impl SourceConfig {
    /// Build the handle, falling back to `default_range` when no range is set.
    ///
    /// Sheets sources read their credentials from the environment here.
    pub fn handle(&self, default_range: &str) -> Result<SourceHandle, ComputeError> {
        match self {
            SourceConfig::Sheets {
                spreadsheet_id,
                range,
            } => {
                if spreadsheet_id.trim().is_empty() {
                    return Err(ComputeError::InvalidConfig(
                        "spreadsheet_id must not be empty".to_string(),
                    ));
                }
                let source = SheetsSource::new(spreadsheet_id.trim(), SheetsAuth::from_env()?);
                Ok(SourceHandle::new(
                    Arc::new(source),
                    range.as_deref().unwrap_or(default_range),
                ))
            }
            SourceConfig::Csv { path } => Ok(SourceHandle::new(
                Arc::new(CsvSource::new(path.clone())),
                default_range,
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub vitals: Option<SourceConfig>,
    pub scores: Option<SourceConfig>,
    pub calories: CalorieParams,
    pub comparison_mode: ComparisonMode,
    pub summary_mode: SummaryMode,
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ComputeError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        self.calories.validate()
    }

    pub fn vitals_handle(&self) -> Result<SourceHandle, ComputeError> {
        Self::dataset_handle("vitals", self.vitals.as_ref(), DEFAULT_VITALS_RANGE)
    }

    pub fn scores_handle(&self) -> Result<SourceHandle, ComputeError> {
        Self::dataset_handle("scores", self.scores.as_ref(), DEFAULT_SCORES_RANGE)
    }

    fn dataset_handle(
        dataset: &str,
        source: Option<&SourceConfig>,
        default_range: &str,
    ) -> Result<SourceHandle, ComputeError> {
        source
            .ok_or_else(|| {
                ComputeError::InvalidConfig(format!("no {} source configured", dataset))
            })?
            .handle(default_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = DashboardConfig::from_json("{}").unwrap();

        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.calories, CalorieParams::default());
        assert_eq!(config.comparison_mode, ComparisonMode::PreviousReading);
        assert_eq!(config.summary_mode, SummaryMode::PerDateAggregates);
    }

    #[test]
    fn test_full_document() {
        let json = r#"{
            "vitals": { "kind": "sheets", "spreadsheet_id": "abc123", "range": "Vitals!A:E" },
            "scores": { "kind": "csv", "path": "data/scores.csv" },
            "calories": { "body_weight_kg": 82.0 },
            "comparison_mode": "mean_value",
            "summary_mode": "recompute"
        }"#;
        let config = DashboardConfig::from_json(json).unwrap();

        assert_eq!(
            config.vitals,
            Some(SourceConfig::Sheets {
                spreadsheet_id: "abc123".to_string(),
                range: Some("Vitals!A:E".to_string()),
            })
        );
        assert_eq!(
            config.scores,
            Some(SourceConfig::Csv {
                path: PathBuf::from("data/scores.csv")
            })
        );
        assert_eq!(config.calories.body_weight_kg, 82.0);
        assert_eq!(config.calories.timer_window_seconds, 15.0);
        assert_eq!(config.comparison_mode, ComparisonMode::MeanValue);
        assert_eq!(config.summary_mode, SummaryMode::Recompute);
    }

    #[test]
    fn test_out_of_range_calories_rejected() {
        let result = DashboardConfig::from_json(r#"{ "calories": { "met": 12.0 } }"#);
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_source_kind_rejected() {
        let result = DashboardConfig::from_json(r#"{ "vitals": { "kind": "ftp", "path": "x" } }"#);
        assert!(matches!(result, Err(ComputeError::JsonError(_))));
    }

    #[test]
    fn test_csv_handle_uses_default_range() {
        let config = SourceConfig::Csv {
            path: PathBuf::from("vitals.csv"),
        };
        let handle = config.handle(DEFAULT_VITALS_RANGE).unwrap();

        assert_eq!(handle.range(), "Sheet2");
        assert_eq!(handle.source_id(), "csv:vitals.csv");
    }

    #[test]
    fn test_missing_source_is_config_error() {
        let config = DashboardConfig::default();
        assert!(matches!(config.scores_handle(), Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_spreadsheet_id_rejected() {
        let config = SourceConfig::Sheets {
            spreadsheet_id: "  ".to_string(),
            range: None,
        };
        assert!(config.handle(DEFAULT_SCORES_RANGE).is_err());
    }
}
