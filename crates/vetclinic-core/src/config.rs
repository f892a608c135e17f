//! Runtime configuration supplied by the host app.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{Database, DbResult};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Settings for one clinic session.
///
/// Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClinicConfig {
    /// SQLite file; `None` keeps everything in memory
    pub database_path: Option<String>,
    /// Snapshots a slow subscriber may fall behind before skipping
    pub channel_capacity: usize,
    /// `tracing` filter directive, e.g. `"vetclinic_core=debug"`
    pub log_filter: String,
    /// Worker threads for the background runtime
    pub worker_threads: usize,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            channel_capacity: 16,
            log_filter: "info".to_string(),
            worker_threads: 1,
        }
    }
}

impl ClinicConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be at least 1".into()));
        }
        if self.worker_threads == 0 {
            return Err(ConfigError::Invalid("worker_threads must be at least 1".into()));
        }
        if matches!(&self.database_path, Some(p) if p.trim().is_empty()) {
            return Err(ConfigError::Invalid("database_path must not be blank".into()));
        }
        Ok(())
    }

    /// Open the configured database.
    pub fn open_database(&self) -> DbResult<Database> {
        match &self.database_path {
            Some(path) => Database::open(path),
            None => Database::open_in_memory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = ClinicConfig::from_json("{}").unwrap();
        assert_eq!(config, ClinicConfig::default());
        assert_eq!(config.channel_capacity, 16);
    }

    #[test]
    fn test_partial_json() {
        let config =
            ClinicConfig::from_json(r#"{"database_path": "/tmp/clinic.db", "worker_threads": 2}"#)
                .unwrap();
        assert_eq!(config.database_path.as_deref(), Some("/tmp/clinic.db"));
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let result = ClinicConfig::from_json(r#"{"channel_capacity": 0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_blank_path() {
        let result = ClinicConfig::from_json(r#"{"database_path": "  "}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            ClinicConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClinicConfig {
            database_path: Some(dir.path().join("clinic.db").to_string_lossy().into_owned()),
            ..Default::default()
        };
        let db = config.open_database().unwrap();
        assert_eq!(db.count_patients().unwrap(), 0);
    }
}
