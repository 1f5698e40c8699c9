//! Dashboard configuration.
//!
//! Priority (highest to lowest):
//!
//! 1. Environment variables (`INDICATOR_DASH_*`)
//! 2. JSON file (`$INDICATOR_DASH_CONFIG`, else `indicator-dash.json`)
//! 3. Default values

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::data::filter::YearRange;

pub const CONFIG_PATH_ENV: &str = "INDICATOR_DASH_CONFIG";
pub const SUMMARY_COUNTRY_ENV: &str = "INDICATOR_DASH_SUMMARY_COUNTRY";
pub const DEFAULT_CONFIG_FILE: &str = "indicator-dash.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration value for '{key}': {message}")]
    Invalid { key: String, message: String },
}

/// Main window size in logical points.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 900.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Bounds of the year range control.
    pub years: YearRange,
    /// Country shown in the sidebar summary.
    pub summary_country: String,
    pub window: WindowConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            years: YearRange::default(),
            summary_country: "India".to_string(),
            window: WindowConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Resolve the configuration from file and environment. Never fails:
    /// problems are logged and defaults used instead.
    pub fn load() -> Self {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let path = explicit
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let base = if explicit.is_some() || path.exists() {
            match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring configuration: {e}");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `INDICATOR_DASH_*` overrides read through `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(country) = lookup(SUMMARY_COUNTRY_ENV).filter(|c| !c.trim().is_empty()) {
            self.summary_country = country.trim().to_string();
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.years.min > self.years.max {
            return Err(ConfigError::Invalid {
                key: "years".to_string(),
                message: format!("min {} is after max {}", self.years.min, self.years.max),
            });
        }
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "window".to_string(),
                message: "width and height must be positive".to_string(),
            });
        }
        Ok(())
    }
}
