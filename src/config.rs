//! Engine configuration
//!
//! Loaded from a JSON file. Every field is optional and falls back to the
//! defaults below; the loaded file is validated before use.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::executor::FieldResolver;
use crate::observability::Severity;
use crate::store::RecordStore;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Unique key field of the record store (default: "roll_no")
    #[serde(default = "default_key_field")]
    pub key_field: String,

    /// Derived average field name (default: "avg_grade")
    #[serde(default = "default_average_field")]
    pub average_field: String,

    /// List field the average is computed over (default: "grades")
    #[serde(default = "default_average_source")]
    pub average_source: String,

    /// Derived count field name (default: "course_count")
    #[serde(default = "default_count_field")]
    pub count_field: String,

    /// List field that is counted (default: "courses")
    #[serde(default = "default_count_source")]
    pub count_source: String,

    /// Extra field names that read another record field, e.g.
    /// `{"student": "name"}` (default: none)
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,

    /// Undo history depth (default: 100)
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Reject unknown field names at parse time (default: false)
    #[serde(default)]
    pub strict_fields: bool,

    /// Minimum log severity (default: "INFO")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_key_field() -> String {
    "roll_no".to_string()
}
fn default_average_field() -> String {
    "avg_grade".to_string()
}
fn default_average_source() -> String {
    "grades".to_string()
}
fn default_count_field() -> String {
    "course_count".to_string()
}
fn default_count_source() -> String {
    "courses".to_string()
}
fn default_history_capacity() -> usize {
    100
}
fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_field: default_key_field(),
            average_field: default_average_field(),
            average_source: default_average_source(),
            count_field: default_count_field(),
            count_source: default_count_source(),
            aliases: BTreeMap::new(),
            history_capacity: default_history_capacity(),
            strict_fields: false,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field names, capacity and log level
    pub fn validate(&self) -> ConfigResult<()> {
        let names = [
            ("key_field", &self.key_field),
            ("average_field", &self.average_field),
            ("average_source", &self.average_source),
            ("count_field", &self.count_field),
            ("count_source", &self.count_source),
        ];
        for (setting, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", setting)));
            }
        }

        let average = self.average_field.to_lowercase();
        let count = self.count_field.to_lowercase();
        let key = self.key_field.to_lowercase();
        if average == count {
            return Err(ConfigError::Invalid(format!(
                "average_field and count_field are both '{}'",
                self.average_field
            )));
        }
        if average == key || count == key {
            return Err(ConfigError::Invalid(format!(
                "Derived fields must differ from key_field '{}'",
                self.key_field
            )));
        }

        for (alias, source) in &self.aliases {
            let name = alias.to_lowercase();
            if name.trim().is_empty() || source.trim().is_empty() {
                return Err(ConfigError::Invalid("aliases must not be empty".into()));
            }
            if name == average || name == count || name == key {
                return Err(ConfigError::Invalid(format!(
                    "Alias '{}' shadows a configured field",
                    alias
                )));
            }
        }

        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid("history_capacity must be > 0".into()));
        }

        self.log_severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn log_severity(&self) -> ConfigResult<Severity> {
        self.log_level.parse().map_err(ConfigError::Invalid)
    }

    /// Field resolver with the configured derived fields
    pub fn resolver(&self) -> FieldResolver {
        let resolver = FieldResolver::new()
            .with_average(&self.average_field, &self.average_source)
            .with_count(&self.count_field, &self.count_source);
        self.aliases
            .iter()
            .fold(resolver, |r, (alias, source)| r.with_alias(alias, source))
    }

    /// Empty record store keyed and bounded as configured
    pub fn store(&self) -> RecordStore {
        RecordStore::new(&self.key_field, self.history_capacity)
    }
}
