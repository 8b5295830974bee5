//! Ticker Chart - Main Library
//!
//! Streaming price chart in the terminal.
//!
//! ## Architecture
//!
//! - **bin_common**: configuration, logging and shutdown helpers for binaries
//! - **terminal**: ratatui render surface for the chart
//! - **price_feed**: live trade-stream client (re-exported from workspace)
//! - **chart**: chart model, grid, viewport and render loop (re-exported)
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use ticker_chart::bin_common::{load_config_from_env, AppConfig, ConfigType};
//! use ticker_chart::terminal::TerminalSurface;
//! ```

// Re-export workspace libraries for convenience
pub use chart;
pub use price_feed;

pub mod terminal;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod config;
    pub mod logging;
    pub mod shutdown;

    pub use cli::{load_config_from_env, parse_args, ConfigType};
    pub use config::{AppConfig, ConfigSource, LoggingConfig};
    pub use logging::init_tracing;
    pub use shutdown::ShutdownManager;
}
