//! Configuration for an enrichment run, loaded from a JSON file.
use crate::enrich::DescriptionTemplate;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Where the descriptions live and how they are merged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Spreadsheet resource ID (or workbook path for the `.xlsx` backend)
    pub spreadsheet_id: String,

    /// Sheet listing the tracked tables
    #[serde(default = "default_index_sheet")]
    pub index_sheet: String,

    /// Column of the index sheet holding table names
    #[serde(default = "default_table_column")]
    pub table_column: String,

    /// Column of each table sheet holding column descriptions
    #[serde(default = "default_description_column")]
    pub description_column: String,

    /// The cached index is reused while the spreadsheet changed at most this many days ago
    #[serde(default)]
    pub max_last_update_days: i64,

    #[serde(default)]
    pub template: DescriptionTemplate,

    /// Authorized-user token file
    #[serde(default = "default_token_path")]
    pub token_path: String,

    /// Sheets API base URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Drive API base URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_base: Option<String>,
}

fn default_index_sheet() -> String {
    "Tables".to_owned()
}

fn default_table_column() -> String {
    "Table".to_owned()
}

fn default_description_column() -> String {
    "Description".to_owned()
}

fn default_token_path() -> String {
    "token.json".to_owned()
}

impl EnrichmentConfig {
    /// Default configuration for one spreadsheet.
    pub fn new(spreadsheet_id: &str) -> Self {
        EnrichmentConfig {
            spreadsheet_id: spreadsheet_id.to_owned(),
            index_sheet: default_index_sheet(),
            table_column: default_table_column(),
            description_column: default_description_column(),
            max_last_update_days: 0,
            template: DescriptionTemplate::default(),
            token_path: default_token_path(),
            api_base: None,
            drive_base: None,
        }
    }

    /// Load configuration from a JSON file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("spreadsheet_id", &self.spreadsheet_id),
            ("index_sheet", &self.index_sheet),
            ("table_column", &self.table_column),
            ("description_column", &self.description_column),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: "Value must not be empty".to_string(),
                });
            }
        }

        if self.max_last_update_days < 0 {
            return Err(ConfigError::Invalid {
                field: "max_last_update_days".to_string(),
                reason: "Threshold must not be negative".to_string(),
            });
        }

        for (field, value) in [("api_base", &self.api_base), ("drive_base", &self.drive_base)] {
            if let Some(base) = value {
                Url::parse(base).map_err(|e| ConfigError::Invalid {
                    field: field.to_string(),
                    reason: e.to_string(),
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: EnrichmentConfig = serde_json::from_str(r#"{ "spreadsheet_id": "abc" }"#).unwrap();
        assert_eq!(config, EnrichmentConfig::new("abc"));
        assert_eq!(config.index_sheet, "Tables");
        assert_eq!(config.table_column, "Table");
        assert_eq!(config.description_column, "Description");
        assert_eq!(config.max_last_update_days, 0);
        assert_eq!(config.token_path, "token.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_file_with_localized_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enrichment.json");
        std::fs::write(&path, r#"{
            "spreadsheet_id": "abc",
            "index_sheet": "Список таблиц",
            "table_column": "Таблица",
            "description_column": "Описание",
            "max_last_update_days": 3,
            "template": {
                "source_label": "Описание из БД",
                "spreadsheet_label": "Описание из GS",
                "placeholder": "Комментарий отсутствует"
            }
        }"#).unwrap();

        let config = EnrichmentConfig::from_file(&path).unwrap();
        assert_eq!(config.index_sheet, "Список таблиц");
        assert_eq!(config.max_last_update_days, 3);
        assert_eq!(config.template.placeholder, "Комментарий отсутствует");
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = EnrichmentConfig::new(" ");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "spreadsheet_id"));

        config.spreadsheet_id = "abc".to_owned();
        config.max_last_update_days = -1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_last_update_days"));

        config.max_last_update_days = 0;
        config.api_base = Some("not a url".to_owned());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "api_base"));
    }

    #[test]
    fn reports_read_and_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(EnrichmentConfig::from_file(&missing), Err(ConfigError::Read { .. })));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();
        assert!(matches!(EnrichmentConfig::from_file(&broken), Err(ConfigError::Parse(_))));
    }
}
