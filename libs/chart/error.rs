use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by the chart crate
#[derive(Error, Debug)]
pub enum ChartError {
    /// Retained-segment capacity must be at least one
    #[error("Invalid capacity: {0} (must be > 0)")]
    InvalidCapacity(usize),

    /// Invalid render loop state transition
    #[error("Invalid state transition: {0}")]
    InvalidState(String),

    /// Render surface failed to draw or poll
    #[error("Surface error: {0}")]
    Surface(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<std::io::Error> for ChartError {
    fn from(err: std::io::Error) -> Self {
        ChartError::Surface(err.to_string())
    }
}
