//! # Price Feed
//!
//! Live price samples from a single exchange trade stream.
//!
//! ## Layers
//!
//! - **transport**: reconnecting WebSocket client with a type-state builder,
//!   pluggable decoder/handler and reconnection strategies
//! - **binance**: combined-stream envelope types and price decoding
//! - **feed**: [`PriceFeed`], which keeps the latest [`PriceSample`] and
//!   notifies subscribers once per decoded message, in arrival order
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut feed = PriceFeed::detached(&FeedConfig::default())?;
//! feed.on_update(|sample| println!("{}", sample.value));
//! feed.on_error(|err| eprintln!("feed error: {}", err));
//! feed.start().await?;
//!
//! let latest = feed.latest();
//! ```

pub mod binance;
pub mod config;
pub mod error;
pub mod feed;
pub mod sample;
pub mod transport;

pub use binance::{decode_price, stream_url, DecodeError, TradeEnvelope};
pub use config::{FeedConfig, ReconnectConfig};
pub use error::FeedError;
pub use feed::{FeedHandle, FeedMessage, FeedStatus, PriceFeed, TradeDecoder};
pub use sample::PriceSample;
pub use transport::{
    ClientEvent, ConnectionState, ExponentialBackoff, FixedDelay, MessageDecoder,
    MessageHandler, NeverReconnect, ReconnectionStrategy, StreamClient, StreamClientBuilder,
    WsMessage,
};

/// Type alias for Result with FeedError
pub type Result<T> = std::result::Result<T, FeedError>;
