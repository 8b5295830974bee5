use crate::transport::client::{ClientSettings, StreamClient};
use crate::transport::message::{MessageDecoder, MessageHandler};
use crate::transport::reconnect::{NeverReconnect, ReconnectionStrategy};
use crate::{FeedError, Result};
use std::marker::PhantomData;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Type-state markers: `build()` only exists once both a URL and a decoder
/// have been supplied.
pub mod states {
    /// URL has not been set
    pub struct NoUrl;
    /// URL has been set
    pub struct HasUrl;
    /// Decoder has not been set
    pub struct NoDecoder;
    /// Decoder has been set
    pub struct HasDecoder;
}

use states::*;

/// Type-state builder for [`StreamClient`]
pub struct StreamClientBuilder<U, Dc, D> {
    _state: PhantomData<(U, Dc)>,
    url: Option<String>,
    decoder: Option<D>,
    handler: Option<Box<dyn std::any::Any + Send>>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl StreamClientBuilder<NoUrl, NoDecoder, ()> {
    pub fn new() -> Self {
        Self {
            _state: PhantomData,
            url: None,
            decoder: None,
            handler: None,
            reconnect_strategy: None,
            shutdown_flag: None,
        }
    }
}

impl Default for StreamClientBuilder<NoUrl, NoDecoder, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Dc, D> StreamClientBuilder<NoUrl, Dc, D> {
    /// WebSocket URL (ws:// or wss://)
    pub fn url(self, url: impl Into<String>) -> StreamClientBuilder<HasUrl, Dc, D> {
        StreamClientBuilder {
            _state: PhantomData,
            url: Some(url.into()),
            decoder: self.decoder,
            handler: self.handler,
            reconnect_strategy: self.reconnect_strategy,
            shutdown_flag: self.shutdown_flag,
        }
    }
}

impl<U> StreamClientBuilder<U, NoDecoder, ()> {
    pub fn decoder<D: MessageDecoder>(self, decoder: D) -> StreamClientBuilder<U, HasDecoder, D> {
        StreamClientBuilder {
            _state: PhantomData,
            url: self.url,
            decoder: Some(decoder),
            handler: None,
            reconnect_strategy: self.reconnect_strategy,
            shutdown_flag: self.shutdown_flag,
        }
    }
}

impl<U, Dc, D> StreamClientBuilder<U, Dc, D> {
    /// Defaults to [`NeverReconnect`]
    pub fn reconnect_strategy<S>(mut self, strategy: S) -> Self
    where
        S: ReconnectionStrategy + 'static,
    {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    pub fn boxed_reconnect_strategy(mut self, strategy: Box<dyn ReconnectionStrategy>) -> Self {
        self.reconnect_strategy = Some(strategy);
        self
    }

    /// External run flag (true = keep running). The client clears it on
    /// shutdown, so share it only with things that should stop too.
    pub fn shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

impl<U, D: MessageDecoder> StreamClientBuilder<U, HasDecoder, D> {
    /// Handler for decoded messages, run on a dedicated thread
    pub fn handler<H>(mut self, handler: H) -> Self
    where
        H: MessageHandler<D::Message>,
    {
        let boxed: Box<dyn MessageHandler<D::Message>> = Box::new(handler);
        self.handler = Some(Box::new(boxed));
        self
    }
}

impl<D: MessageDecoder> StreamClientBuilder<HasUrl, HasDecoder, D> {
    /// Spawn the client. Must be called inside a tokio runtime.
    pub async fn build(self) -> Result<StreamClient<D>> {
        let url = self
            .url
            .ok_or_else(|| FeedError::Configuration("url not set".into()))?;
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(FeedError::Configuration(format!(
                "unsupported URL scheme: {}",
                url
            )));
        }

        let decoder = self
            .decoder
            .ok_or_else(|| FeedError::Configuration("decoder not set".into()))?;

        let handler = match self.handler {
            Some(any) => Some(
                *any.downcast::<Box<dyn MessageHandler<D::Message>>>()
                    .map_err(|_| FeedError::Configuration("handler type mismatch".into()))?,
            ),
            None => None,
        };

        let settings = ClientSettings {
            url,
            decoder: Arc::new(decoder),
            reconnect_strategy: self
                .reconnect_strategy
                .unwrap_or_else(|| Box::new(NeverReconnect)),
            shutdown_flag: self
                .shutdown_flag
                .unwrap_or_else(|| Arc::new(AtomicBool::new(true))),
        };

        StreamClient::spawn(settings, handler)
    }
}
