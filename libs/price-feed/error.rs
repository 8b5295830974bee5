use thiserror::Error;

/// Main error type for the price feed
#[derive(Error, Debug, Clone)]
pub enum FeedError {
    /// WebSocket protocol or I/O error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Connection closed by the remote side
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid state transition
    #[error("Invalid state transition: {0}")]
    InvalidState(String),
}
