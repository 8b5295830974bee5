//! Live price feed
//!
//! Keeps the latest decoded [`PriceSample`] and pushes every new sample to
//! subscribers. Decode failures never leave this module: the frame is
//! counted, logged and dropped, and `latest()` keeps its previous value.
//! Transport failures go to the error sinks; the last good value stays
//! available until a new message arrives.

use crate::binance::{decode_price, DecodeError};
use crate::config::FeedConfig;
use crate::sample::PriceSample;
use crate::transport::{
    AtomicConnectionState, AtomicMetrics, ClientEvent, ConnectionState, MessageDecoder,
    MessageHandler, StreamClient, StreamClientBuilder, WsMessage,
};
use crate::{FeedError, Result};
use crossbeam_channel::Receiver;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

type UpdateHandler = Box<dyn FnMut(&PriceSample) + Send>;
type ErrorHandler = Box<dyn FnMut(&FeedError) + Send>;

/// Log a debug line every this many samples
const SAMPLE_LOG_INTERVAL: u64 = 1000;

/// Decoded frame, as handed from the read loop to the handler thread
#[derive(Debug)]
pub enum FeedMessage {
    /// Raw price, not yet normalized
    Price(Decimal),
    Malformed(DecodeError),
}

/// Decodes combined-stream trade frames
#[derive(Debug, Default, Clone, Copy)]
pub struct TradeDecoder;

impl TradeDecoder {
    pub fn decode_frame(message: &WsMessage) -> FeedMessage {
        match message {
            WsMessage::Text(text) => match decode_price(text) {
                Ok(price) => FeedMessage::Price(price),
                Err(e) => FeedMessage::Malformed(e),
            },
            WsMessage::Binary(data) => FeedMessage::Malformed(DecodeError::NotText(data.len())),
        }
    }
}

#[async_trait::async_trait]
impl MessageDecoder for TradeDecoder {
    type Message = FeedMessage;

    async fn decode(&self, message: WsMessage) -> Result<FeedMessage> {
        Ok(Self::decode_frame(&message))
    }
}

/// Point-in-time feed health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStatus {
    pub connection: ConnectionState,
    pub messages_received: u64,
    pub samples_published: u64,
    pub messages_dropped: u64,
    pub reconnects: u64,
}

struct FeedShared {
    latest: RwLock<PriceSample>,
    published: AtomicU64,
    dropped: AtomicU64,
    metrics: AtomicMetrics,
    connection: AtomicConnectionState,
    update_handlers: Mutex<Vec<UpdateHandler>>,
    error_handlers: Mutex<Vec<ErrorHandler>>,
}

impl FeedShared {
    fn new(placeholder: Decimal) -> Self {
        Self {
            latest: RwLock::new(PriceSample::placeholder(placeholder)),
            published: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            metrics: AtomicMetrics::new(),
            connection: AtomicConnectionState::new(ConnectionState::Disconnected),
            update_handlers: Mutex::new(Vec::new()),
            error_handlers: Mutex::new(Vec::new()),
        }
    }

    /// Publish one decoded frame. Returns the new sample, if any.
    fn accept(&self, message: FeedMessage) -> Option<PriceSample> {
        self.metrics.increment_received();

        match message {
            FeedMessage::Price(price) => {
                let sequence = self.published.fetch_add(1, Ordering::AcqRel) + 1;
                let sample = PriceSample::new(sequence, price);
                *self.latest.write() = sample.clone();

                for handler in self.update_handlers.lock().iter_mut() {
                    handler(&sample);
                }

                if sequence % SAMPLE_LOG_INTERVAL == 1 {
                    debug!("[Feed] Sample #{} = {}", sequence, sample.value);
                }
                Some(sample)
            }
            FeedMessage::Malformed(e) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("[Feed] Dropping malformed message: {}", e);
                None
            }
        }
    }

    fn report_error(&self, error: &FeedError) {
        warn!("[Feed] Transport error: {}", error);
        for handler in self.error_handlers.lock().iter_mut() {
            handler(error);
        }
    }

    fn on_event(&self, event: ClientEvent) {
        match event {
            ClientEvent::Connected => {
                info!("[Feed] Connected to price stream");
                self.connection.set(ConnectionState::Connected);
            }
            ClientEvent::Disconnected => {
                warn!("[Feed] Disconnected; holding last price {}", self.latest.read().value);
                if !self.connection.is_shutting_down() {
                    self.connection.set(ConnectionState::Disconnected);
                }
            }
            ClientEvent::Reconnecting(attempt) => {
                info!("[Feed] Reconnecting (attempt {})", attempt);
                self.metrics.increment_reconnects();
                self.connection.set(ConnectionState::Reconnecting);
            }
            ClientEvent::Error(e) => self.report_error(&e),
        }
    }

    fn status(&self) -> FeedStatus {
        FeedStatus {
            connection: self.connection.get(),
            messages_received: self.metrics.messages_received(),
            samples_published: self.published.load(Ordering::Acquire),
            messages_dropped: self.dropped.load(Ordering::Relaxed),
            reconnects: self.metrics.reconnect_count(),
        }
    }
}

/// Runs on the transport's handler thread
struct FeedHandler {
    shared: Arc<FeedShared>,
}

impl MessageHandler<FeedMessage> for FeedHandler {
    fn handle(&mut self, message: FeedMessage) -> Result<()> {
        self.shared.accept(message);
        Ok(())
    }
}

/// Clonable read-only view of a feed
#[derive(Clone)]
pub struct FeedHandle {
    shared: Arc<FeedShared>,
}

impl FeedHandle {
    pub fn latest(&self) -> PriceSample {
        self.shared.latest.read().clone()
    }

    pub fn status(&self) -> FeedStatus {
        self.shared.status()
    }
}

/// Live price feed over one streaming connection.
///
/// Register handlers before [`PriceFeed::start`] so they see the first
/// sample and the first error:
///
/// ```rust,ignore
/// let mut feed = PriceFeed::detached(&FeedConfig::default())?;
/// feed.on_update(|sample| tracing::info!("price {}", sample.value));
/// feed.start().await?;
/// let now = feed.latest();
/// ```
pub struct PriceFeed {
    shared: Arc<FeedShared>,
    config: FeedConfig,
    client: Option<StreamClient<TradeDecoder>>,
    event_watcher: Option<std::thread::JoinHandle<()>>,
}

impl PriceFeed {
    /// Feed without a connection. Messages only arrive through
    /// [`PriceFeed::inject`] until [`PriceFeed::start`] is called.
    pub fn detached(config: &FeedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(FeedShared::new(config.placeholder()?)),
            config: config.clone(),
            client: None,
            event_watcher: None,
        })
    }

    /// Open the stream connection in the background and return immediately.
    /// Must be called inside a tokio runtime.
    pub async fn start(&mut self) -> Result<()> {
        if self.client.is_some() {
            return Err(FeedError::InvalidState("feed already started".into()));
        }

        let url = self.config.url();
        info!("[Feed] Connecting to {}", url);

        self.shared.connection.set(ConnectionState::Connecting);
        let client = StreamClientBuilder::new()
            .url(&url)
            .decoder(TradeDecoder)
            .handler(FeedHandler {
                shared: Arc::clone(&self.shared),
            })
            .boxed_reconnect_strategy(self.config.reconnect.strategy())
            .build()
            .await?;

        self.event_watcher = Some(spawn_event_watcher(
            client.events(),
            Arc::clone(&self.shared),
        )?);
        self.client = Some(client);
        Ok(())
    }

    /// [`PriceFeed::detached`] followed by [`PriceFeed::start`]. Handlers
    /// registered afterwards may miss the first events.
    pub async fn connect(config: &FeedConfig) -> Result<Self> {
        let mut feed = Self::detached(config)?;
        feed.start().await?;
        Ok(feed)
    }

    /// Last good sample, or the placeholder before the first message
    pub fn latest(&self) -> PriceSample {
        self.shared.latest.read().clone()
    }

    /// Called once per decoded sample, in arrival order, on the thread that
    /// delivers it. Handlers must not register further handlers.
    pub fn on_update<F>(&self, handler: F)
    where
        F: FnMut(&PriceSample) + Send + 'static,
    {
        self.shared.update_handlers.lock().push(Box::new(handler));
    }

    /// Called for connection failures and protocol errors
    pub fn on_error<F>(&self, handler: F)
    where
        F: FnMut(&FeedError) + Send + 'static,
    {
        self.shared.error_handlers.lock().push(Box::new(handler));
    }

    /// Push one inbound frame through the decode/publish path on the
    /// caller's thread.
    pub fn inject(&self, message: WsMessage) -> Option<PriceSample> {
        self.shared.accept(TradeDecoder::decode_frame(&message))
    }

    pub fn status(&self) -> FeedStatus {
        self.shared.status()
    }

    pub fn handle(&self) -> FeedHandle {
        FeedHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connection.is_connected()
    }

    /// Stop the transport and wait for queued samples to be delivered
    pub async fn shutdown(mut self) -> Result<()> {
        self.shared.connection.set(ConnectionState::ShuttingDown);

        if let Some(client) = self.client.take() {
            client.shutdown().await?;
        }
        if let Some(watcher) = self.event_watcher.take() {
            tokio::task::spawn_blocking(move || watcher.join())
                .await
                .map_err(|e| FeedError::InvalidState(format!("event watcher panicked: {}", e)))?
                .map_err(|_| FeedError::InvalidState("event watcher panicked".into()))?;
        }

        info!("[Feed] Stopped");
        Ok(())
    }
}

fn spawn_event_watcher(
    events: Receiver<ClientEvent>,
    shared: Arc<FeedShared>,
) -> Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("feed-events".into())
        .spawn(move || {
            // Ends when the transport task exits and drops its sender
            for event in events.iter() {
                shared.on_event(event);
            }
        })
        .map_err(|e| FeedError::Configuration(format!("failed to spawn event watcher: {}", e)))
}
