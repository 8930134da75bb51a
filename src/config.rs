//! Runtime configuration, read from an optional JSON file.

use crate::error::ExpTableError;
use crate::error::ResultMessage;
use serde::Deserialize;
use serde::Serialize;
use std::fs;

/// Sheet read when none is given.
pub const DEFAULT_SHEET: &str = "ESP";

/// 1-based header row used when none is given.
pub const DEFAULT_HEADER_ROW: usize = 3;

/// Entity column scanned for countries when no header mentions the entity.
pub const DEFAULT_COUNTRY_COLUMN: &str = "D";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_sheet")]
    pub sheet: String,
    #[serde(default = "default_header_row")]
    pub header_row: usize,
    #[serde(default)]
    pub inference: InferenceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet: default_sheet(),
            header_row: default_header_row(),
            inference: InferenceConfig::default(),
        }
    }
}

/// Tuning of the mapping inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// A column is mapped only when its best score exceeds this value
    pub threshold: f64,
    /// Added to the score of a spreadsheet header carrying the matching date keyword
    pub date_boost: f64,
    pub fallback_country_column: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            date_boost: 0.4,
            fallback_country_column: DEFAULT_COUNTRY_COLUMN.to_string(),
        }
    }
}

impl Config {
    /// Loads the configuration file, or the defaults when no file is given.
    pub fn load(file_name: Option<&str>) -> Result<Self, ExpTableError> {
        let Some(file_name) = file_name else {
            return Ok(Self::default());
        };
        let prefix = format!("Could not read the configuration '{file_name}'");
        let content = fs::read_to_string(file_name).map_err(ExpTableError::from).with_prefix(&prefix)?;
        serde_json::from_str(&content).map_err(ExpTableError::from).with_prefix(&prefix)
    }
}

fn default_sheet() -> String {
    DEFAULT_SHEET.to_string()
}

fn default_header_row() -> usize {
    DEFAULT_HEADER_ROW
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.sheet, "ESP");
        assert_eq!(config.header_row, 3);
        assert_eq!(config.inference.threshold, 0.1);
        assert_eq!(config.inference.date_boost, 0.4);
        assert_eq!(config.inference.fallback_country_column, "D");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = serde_json::from_str(r#"{ "sheet": "ENG", "inference": { "threshold": 0.25 } }"#).unwrap();
        assert_eq!(config.sheet, "ENG");
        assert_eq!(config.header_row, 3);
        assert_eq!(config.inference.threshold, 0.25);
        assert_eq!(config.inference.date_boost, 0.4);
    }

    #[test]
    fn load_reads_json_file() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("exp-table.json");
        fs::write(&path, r#"{ "header_row": 5 }"#).unwrap();
        let config = Config::load(path.to_str()).unwrap();
        assert_eq!(config.header_row, 5);
        assert_eq!(config.sheet, "ESP");
    }

    #[test]
    fn load_reports_the_file() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("broken.json");
        fs::write(&path, "{ sheet").unwrap();
        let file_name = path.to_str().unwrap();
        let error = Config::load(Some(file_name)).err().unwrap();
        assert!(error.to_string().starts_with(&format!("Could not read the configuration '{file_name}': ")));
    }
}
