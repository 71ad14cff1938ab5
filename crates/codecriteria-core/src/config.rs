//! Configuration management for CodeCriteria

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "CODECRITERIA";

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Criteria evaluation configuration
    pub criteria: CriteriaConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from an optional TOML file, then environment overrides.
    ///
    /// Without an explicit path the platform config directory is consulted
    /// (`codecriteria.toml`); a missing file there is not an error. Environment
    /// variables use a double underscore between sections, e.g.
    /// `CODECRITERIA__LOGGING__LEVEL=debug`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(default_path) = default_config_path() {
                    builder = builder.add_source(config::File::from(default_path).required(false));
                }
            }
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// Default location of the configuration file, if a home directory is known
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "codecriteria", "codecriteria")
        .map(|dirs| dirs.config_dir().join("codecriteria.toml"))
}

/// Criteria evaluation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaConfig {
    /// Absolute tolerance used by numeric equality comparisons
    pub equality_tolerance: f64,
}

impl Default for CriteriaConfig {
    fn default() -> Self {
        Self {
            equality_tolerance: f64::EPSILON,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
