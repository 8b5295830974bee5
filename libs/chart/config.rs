//! Chart configuration
//!
//! Deserialized from the top level of the application YAML file:
//!
//! ```yaml
//! line_caching: 50
//! append_interval_ms: 1000
//! frame_rate: 60
//! time_step: measured   # or: fixed
//! height_mode: random   # or: price
//! price_half_range: 18
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// How the render loop advances its clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeStepMode {
    /// Real elapsed time between frames
    #[default]
    Measured,
    /// Constant `1 / frame_rate` per frame regardless of actual cadence
    Fixed,
}

/// Where segment heights come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightMode {
    /// Uniform integer in [-2, 2)
    #[default]
    Random,
    /// Latest price normalized over the retained window
    Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Maximum retained segments (FIFO capacity)
    pub line_caching: usize,
    pub append_interval_ms: u64,
    pub frame_rate: u32,
    pub time_step: TimeStepMode,
    pub height_mode: HeightMode,
    /// Price mode maps onto [-price_half_range, +price_half_range]
    pub price_half_range: f64,
    /// Fixes the random height sequence
    pub seed: Option<u64>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            line_caching: 50,
            append_interval_ms: 1000,
            frame_rate: 60,
            time_step: TimeStepMode::default(),
            height_mode: HeightMode::default(),
            price_half_range: 18.0,
            seed: None,
        }
    }
}

impl ChartConfig {
    pub fn append_interval(&self) -> Duration {
        Duration::from_millis(self.append_interval_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.line_caching == 0 {
            return Err(ConfigError::ValidationError(
                "line_caching must be greater than 0".to_string(),
            ));
        }
        if self.append_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "append_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.frame_rate == 0 || self.frame_rate > 240 {
            return Err(ConfigError::ValidationError(format!(
                "frame_rate must be in 1..=240, got {}",
                self.frame_rate
            )));
        }
        if !self.price_half_range.is_finite() || self.price_half_range <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "price_half_range must be a positive number, got {}",
                self.price_half_range
            )));
        }
        Ok(())
    }
}
