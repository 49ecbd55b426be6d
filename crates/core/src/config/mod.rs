//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (TAB_BEAR_*)
//! 2. TOML config file (if TAB_BEAR_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::session::CacheLimits;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (TAB_BEAR_*)
/// 2. TOML config file (if TAB_BEAR_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding both the metadata and bulk stores.
    ///
    /// Set via TAB_BEAR_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory where exported sessions are written.
    ///
    /// Set via TAB_BEAR_EXPORT_DIR environment variable.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Maximum number of captured pages kept in the bulk collection.
    ///
    /// Set via TAB_BEAR_MAX_ENTRIES environment variable.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Maximum markdown length (in characters) accepted for one page.
    ///
    /// Set via TAB_BEAR_MAX_MARKDOWN_CHARS environment variable.
    #[serde(default = "default_max_markdown_chars")]
    pub max_markdown_chars: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./tab-bear.sqlite")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_entries() -> usize {
    crate::session::MAX_CACHE_ENTRIES
}

fn default_max_markdown_chars() -> usize {
    crate::model::MAX_MARKDOWN_LENGTH
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            export_dir: default_export_dir(),
            max_entries: default_max_entries(),
            max_markdown_chars: default_max_markdown_chars(),
        }
    }
}

impl AppConfig {
    /// Writer limits derived from this configuration.
    pub fn limits(&self) -> CacheLimits {
        CacheLimits { max_entries: self.max_entries, max_markdown_chars: self.max_markdown_chars }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `TAB_BEAR_`
    /// 2. TOML file from `TAB_BEAR_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("TAB_BEAR_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("TAB_BEAR_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
