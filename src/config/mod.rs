//! Engine configuration
//!
//! Server-wide defaults for permission budgets and path selection. Every
//! field is optional in the JSON file.

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::node::QName;
use crate::query::ExecutionMode;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Server defaults consumed by the query executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default permission check budget (absent = unbounded)
    #[serde(default)]
    pub max_permission_checks: Option<u64>,

    /// Default permission check time budget in ms (absent = unbounded)
    #[serde(default)]
    pub max_permission_check_time_ms: Option<u64>,

    /// Path used when a request does not choose one
    #[serde(default = "default_execution_mode")]
    pub default_execution_mode: ExecutionMode,

    /// Types and aspects the downstream post-filter passes through unchecked
    #[serde(default)]
    pub unfiltered_types: Vec<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_execution_mode() -> ExecutionMode {
    ExecutionMode::Accelerated
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_permission_checks: None,
            max_permission_check_time_ms: None,
            default_execution_mode: default_execution_mode(),
            unfiltered_types: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: EngineConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "log_level must be one of {}, got '{}'",
                LOG_LEVELS.join("/"),
                self.log_level
            )));
        }

        if self.default_execution_mode == ExecutionMode::CacheClear {
            return Err(ConfigError::Invalid(
                "default_execution_mode cannot be cache_clear".into(),
            ));
        }

        self.unfiltered_type_names().map(|_| ())
    }

    /// Parsed `unfiltered_types`
    pub fn unfiltered_type_names(&self) -> ConfigResult<BTreeSet<QName>> {
        self.unfiltered_types
            .iter()
            .map(|name| {
                QName::parse(name)
                    .map_err(|e| ConfigError::Invalid(format!("unfiltered_types: {}", e)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.default_execution_mode, ExecutionMode::Accelerated);
        assert!(config.max_permission_checks.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "max_permission_checks": 1000,
                "max_permission_check_time_ms": 10000,
                "default_execution_mode": "standard",
                "unfiltered_types": ["cm:category"],
                "log_level": "debug"
            }}"#
        )
        .unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.max_permission_checks, Some(1000));
        assert_eq!(config.max_permission_check_time_ms, Some(10000));
        assert_eq!(config.default_execution_mode, ExecutionMode::Standard);
        assert!(config
            .unfiltered_type_names()
            .unwrap()
            .contains(&QName::new("cm", "category")));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/aclquery.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_log_level() {
        let err = EngineConfig::from_json(r#"{"log_level": "loud"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_cache_clear_is_not_a_configurable_mode() {
        let err = EngineConfig::from_json(r#"{"default_execution_mode": "cache_clear"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_unfiltered_type() {
        let err = EngineConfig::from_json(r#"{"unfiltered_types": ["no-prefix"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_time_budget_is_allowed() {
        let config = EngineConfig::from_json(r#"{"max_permission_check_time_ms": 0}"#).unwrap();
        assert_eq!(config.max_permission_check_time_ms, Some(0));
    }
}
