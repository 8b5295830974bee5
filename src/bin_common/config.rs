//! Application configuration
//!
//! One YAML file: chart options at the top level, plus `feed:` and
//! `logging:` sections. Every key is optional.
//!
//! ```yaml
//! line_caching: 50
//! height_mode: price
//! feed:
//!   stream: ethusdt@trade
//!   reconnect:
//!     enabled: false
//! logging:
//!   file: logs/ticker-chart.log
//!   filter: info,price_feed=debug
//! ```

use chart::{ChartConfig, ConfigError};
use price_feed::FeedConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file; `None` disables logging (stdout belongs to the chart)
    pub file: Option<PathBuf>,
    /// EnvFilter directives, overridden by RUST_LOG
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from("logs/ticker-chart.log")),
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub chart: ChartConfig,
    pub feed: FeedConfig,
    pub logging: LoggingConfig,
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The file did not exist
    Defaults(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "loaded from {}", path.display()),
            ConfigSource::Defaults(path) => {
                write!(f, "{} not found, using defaults", path.display())
            }
        }
    }
}

impl AppConfig {
    /// Load and validate. A missing file yields the defaults.
    ///
    /// Runs before logging is set up, so the source is returned for the
    /// caller to log.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults(path.to_path_buf())));
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&contents)?;
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // An empty file parses as null, not as an empty mapping
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: AppConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chart.validate()?;
        self.feed
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("feed: {}", e)))?;
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
