//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `db_path` is empty, and
    /// `ConfigError::Invalid` if:
    /// - `max_entries` is 0 or exceeds 10,000
    /// - `max_markdown_chars` is 0 or exceeds 50,000,000
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Missing {
                field: "db_path".into(),
                hint: "Set TAB_BEAR_DB_PATH environment variable".into(),
            });
        }

        if self.max_entries == 0 {
            return Err(ConfigError::Invalid { field: "max_entries".into(), reason: "must be greater than 0".into() });
        }
        if self.max_entries > 10_000 {
            return Err(ConfigError::Invalid { field: "max_entries".into(), reason: "must not exceed 10000".into() });
        }

        if self.max_markdown_chars == 0 {
            return Err(ConfigError::Invalid {
                field: "max_markdown_chars".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.max_markdown_chars > 50_000_000 {
            return Err(ConfigError::Invalid {
                field: "max_markdown_chars".into(),
                reason: "must not exceed 50000000".into(),
            });
        }

        if self.max_entries > crate::session::MAX_CACHE_ENTRIES {
            tracing::warn!(
                max_entries = self.max_entries,
                "max_entries is above the default; the URL index grows with it"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_db_path() {
        let config = AppConfig { db_path: PathBuf::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "db_path"));
    }

    #[test]
    fn test_validate_max_entries_zero() {
        let config = AppConfig { max_entries: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_entries"));
    }

    #[test]
    fn test_validate_max_entries_exceeds_limit() {
        let config = AppConfig { max_entries: 10_001, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_entries"));
    }

    #[test]
    fn test_validate_markdown_zero() {
        let config = AppConfig { max_markdown_chars: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_markdown_chars"));
    }

    #[test]
    fn test_validate_max_values() {
        let config = AppConfig { max_entries: 10_000, max_markdown_chars: 50_000_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
