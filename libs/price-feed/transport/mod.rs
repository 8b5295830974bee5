//! # Transport
//!
//! Reconnecting WebSocket client used by the price feed.
//!
//! ```text
//! WebSocket → read loop → MessageDecoder (inline, arrival order)
//!                              ↓
//!                     crossbeam channel (unbounded)
//!                              ↓
//!                  MessageHandler (dedicated OS thread)
//! ```
//!
//! Connection lifecycle events (`Connected`, `Disconnected`,
//! `Reconnecting`, `Error`) are delivered on a separate event channel.
//! After a disconnect the configured [`ReconnectionStrategy`] decides
//! whether and when to try again.

pub mod builder;
pub mod client;
pub mod connection_state;
pub mod message;
pub mod reconnect;

pub use builder::{states, StreamClientBuilder};
pub use client::{ClientEvent, Metrics, StreamClient};
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
pub use message::{MessageDecoder, MessageHandler, WsMessage};
pub use reconnect::{ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy};

/// Start building a stream client
///
/// # Example
/// ```ignore
/// let client = transport::builder()
///     .url("wss://stream.binance.com:9443/stream?streams=btcusdt@trade")
///     .decoder(TradeDecoder)
///     .handler(FeedHandler::new(shared))
///     .reconnect_strategy(ExponentialBackoff::new(
///         Duration::from_millis(500),
///         Duration::from_secs(30),
///         None,
///     ))
///     .build()
///     .await?;
/// ```
pub fn builder() -> StreamClientBuilder<states::NoUrl, states::NoDecoder, ()> {
    StreamClientBuilder::new()
}
