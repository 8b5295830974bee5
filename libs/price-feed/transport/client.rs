use crate::transport::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::transport::message::{MessageDecoder, MessageHandler, WsMessage};
use crate::transport::reconnect::ReconnectionStrategy;
use crate::{FeedError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// How often a reconnect delay re-checks the shutdown flag
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Internal control messages for the I/O task
#[derive(Debug)]
enum ClientCommand {
    Shutdown,
}

/// Connection lifecycle notifications
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Connected,
    Disconnected,
    /// Reconnecting (attempt number, 1-based)
    Reconnecting(usize),
    Error(FeedError),
}

/// Client metrics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub messages_received: u64,
    pub reconnect_count: u64,
    pub connection_state: ConnectionState,
}

/// Settings assembled by the builder
pub(crate) struct ClientSettings<D: MessageDecoder> {
    pub(crate) url: String,
    pub(crate) decoder: Arc<D>,
    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,
    /// true = keep running, false = stop and do not reconnect
    pub(crate) shutdown_flag: Arc<AtomicBool>,
}

/// Reconnecting WebSocket client for one stream.
///
/// Frames are decoded in the I/O task in arrival order and handed to a single
/// handler thread, so the handler sees messages in exactly the order the
/// server sent them.
pub struct StreamClient<D: MessageDecoder> {
    url: String,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    command_tx: mpsc::UnboundedSender<ClientCommand>,
    event_rx: Receiver<ClientEvent>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
    handler_handle: Option<std::thread::JoinHandle<()>>,
    shutdown_flag: Arc<AtomicBool>,
    _decoder: std::marker::PhantomData<D>,
}

impl<D: MessageDecoder> StreamClient<D> {
    /// Spawn the I/O task and the handler thread.
    ///
    /// Must be called from within a tokio runtime. Returns before the first
    /// connection attempt completes.
    pub(crate) fn spawn(
        settings: ClientSettings<D>,
        handler: Option<Box<dyn MessageHandler<D::Message>>>,
    ) -> Result<Self> {
        let state = Arc::new(AtomicConnectionState::new(ConnectionState::Disconnected));
        let metrics = Arc::new(AtomicMetrics::new());
        let shutdown_flag = Arc::clone(&settings.shutdown_flag);
        let url = settings.url.clone();

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = unbounded();
        let (message_tx, message_rx) = unbounded::<D::Message>();

        let handler_handle = match handler {
            Some(handler) => Some(spawn_handler_thread(handler, message_rx)?),
            None => None,
        };

        let task_handle = {
            let state = Arc::clone(&state);
            let metrics = Arc::clone(&metrics);

            tokio::spawn(async move {
                run_client(settings, state, metrics, command_rx, event_tx, message_tx).await;
            })
        };

        Ok(Self {
            url,
            state,
            metrics,
            command_tx,
            event_rx,
            task_handle: Some(task_handle),
            handler_handle,
            shutdown_flag,
            _decoder: std::marker::PhantomData,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            messages_received: self.metrics.messages_received(),
            reconnect_count: self.metrics.reconnect_count(),
            connection_state: self.state.get(),
        }
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Event receiver; disconnects once the I/O task has exited
    pub fn events(&self) -> Receiver<ClientEvent> {
        self.event_rx.clone()
    }

    pub fn shutdown_flag(&self) -> &Arc<AtomicBool> {
        &self.shutdown_flag
    }

    /// Close the connection, stop reconnecting and wait for the handler
    /// thread to drain.
    pub async fn shutdown(mut self) -> Result<()> {
        info!("[Transport] Shutting down client for {}", self.url);
        self.stop_signals();

        if let Some(handle) = self.task_handle.take() {
            let _ = handle.await;
        }

        // The I/O task dropped the message sender, so the handler exits
        // after the messages already queued.
        if let Some(handle) = self.handler_handle.take() {
            let joined = tokio::task::spawn_blocking(move || handle.join()).await;
            if !matches!(joined, Ok(Ok(()))) {
                warn!("[Transport] Handler thread did not exit cleanly");
            }
        }

        debug!("[Transport] Client shut down");
        Ok(())
    }

    fn stop_signals(&self) {
        self.shutdown_flag.store(false, Ordering::Release);
        self.state.set(ConnectionState::ShuttingDown);
        let _ = self.command_tx.send(ClientCommand::Shutdown);
    }
}

impl<D: MessageDecoder> Drop for StreamClient<D> {
    fn drop(&mut self) {
        if self.task_handle.is_some() {
            self.stop_signals();
        }
    }
}

fn spawn_handler_thread<M>(
    mut handler: Box<dyn MessageHandler<M>>,
    message_rx: Receiver<M>,
) -> Result<std::thread::JoinHandle<()>>
where
    M: Send + std::fmt::Debug + 'static,
{
    std::thread::Builder::new()
        .name("feed-handler".into())
        .spawn(move || {
            while let Ok(message) = message_rx.recv() {
                if let Err(e) = handler.handle(message) {
                    error!("[Transport] Handler error: {}", e);
                }
            }
            debug!("[Transport] Handler channel closed, thread exiting");
        })
        .map_err(|e| FeedError::Configuration(format!("failed to spawn handler thread: {}", e)))
}

/// Connect, pump messages, and reconnect per strategy until shutdown
async fn run_client<D: MessageDecoder>(
    settings: ClientSettings<D>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    mut command_rx: mpsc::UnboundedReceiver<ClientCommand>,
    event_tx: Sender<ClientEvent>,
    message_tx: Sender<D::Message>,
) {
    let shutdown_flag = &settings.shutdown_flag;
    let mut reconnect_attempt = 0usize;

    loop {
        if !shutdown_flag.load(Ordering::Acquire) || state.is_shutting_down() {
            debug!("[Transport] Shutdown requested, exiting main loop");
            break;
        }

        state.set(if reconnect_attempt == 0 {
            ConnectionState::Connecting
        } else {
            ConnectionState::Reconnecting
        });

        match connect_async(settings.url.as_str()).await {
            Ok((ws_stream, _)) => {
                info!("[Transport] Connected to {}", settings.url);
                state.set(ConnectionState::Connected);
                let _ = event_tx.send(ClientEvent::Connected);
                let received_before = metrics.messages_received();

                let result = message_loop(
                    ws_stream,
                    &settings,
                    &state,
                    &metrics,
                    &mut command_rx,
                    &message_tx,
                )
                .await;

                if let Err(e) = result {
                    error!("[Transport] Connection error: {}", e);
                    let _ = event_tx.send(ClientEvent::Error(e));
                }

                // Only a connection that delivered frames resets the backoff
                if metrics.messages_received() > received_before {
                    reconnect_attempt = 0;
                }

                if !state.is_shutting_down() {
                    state.set(ConnectionState::Disconnected);
                }
                let _ = event_tx.send(ClientEvent::Disconnected);
            }
            Err(e) => {
                error!("[Transport] Failed to connect to {}: {}", settings.url, e);
                let _ = event_tx.send(ClientEvent::Error(FeedError::WebSocket(e.to_string())));
                state.set(ConnectionState::Disconnected);
                let _ = event_tx.send(ClientEvent::Disconnected);
            }
        }

        if !shutdown_flag.load(Ordering::Acquire) || state.is_shutting_down() {
            break;
        }

        match settings.reconnect_strategy.next_delay(reconnect_attempt) {
            Some(delay) => {
                info!(
                    "[Transport] Reconnecting in {:?} (attempt {})",
                    delay,
                    reconnect_attempt + 1
                );
                if !sleep_unless_shutdown(delay, shutdown_flag).await {
                    debug!("[Transport] Shutdown during reconnection delay");
                    break;
                }
                reconnect_attempt += 1;
                metrics.increment_reconnects();
                let _ = event_tx.send(ClientEvent::Reconnecting(reconnect_attempt));
            }
            None => {
                warn!("[Transport] Reconnection strategy exhausted, stopping");
                break;
            }
        }
    }

    if !state.is_shutting_down() {
        state.set(ConnectionState::Disconnected);
    }
    info!("[Transport] Client task exiting");
}

/// Returns false if shutdown was requested while waiting
async fn sleep_unless_shutdown(duration: Duration, shutdown_flag: &AtomicBool) -> bool {
    let mut elapsed = Duration::ZERO;

    while elapsed < duration {
        if !shutdown_flag.load(Ordering::Acquire) {
            return false;
        }
        let step = SHUTDOWN_POLL_INTERVAL.min(duration - elapsed);
        tokio::time::sleep(step).await;
        elapsed += step;
    }

    shutdown_flag.load(Ordering::Acquire)
}

async fn message_loop<D: MessageDecoder>(
    ws_stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    settings: &ClientSettings<D>,
    state: &AtomicConnectionState,
    metrics: &AtomicMetrics,
    command_rx: &mut mpsc::UnboundedReceiver<ClientCommand>,
    message_tx: &Sender<D::Message>,
) -> Result<()> {
    let (mut write, mut read) = ws_stream.split();

    loop {
        if !settings.shutdown_flag.load(Ordering::Acquire) || state.is_shutting_down() {
            let _ = write.close().await;
            return Ok(());
        }

        tokio::select! {
            msg = read.next() => {
                let msg = match msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => return Err(FeedError::WebSocket(e.to_string())),
                    None => return Err(FeedError::ConnectionClosed("stream ended".into())),
                };

                let ws_msg = match msg {
                    Message::Text(text) => WsMessage::Text(text),
                    Message::Binary(data) => WsMessage::Binary(data),
                    Message::Close(frame) => {
                        let reason = frame
                            .map(|f| format!("{} {}", f.code, f.reason))
                            .unwrap_or_else(|| "no close frame".into());
                        return Err(FeedError::ConnectionClosed(reason));
                    }
                    // tungstenite answers pings itself
                    Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
                };

                metrics.increment_received();

                match settings.decoder.decode(ws_msg).await {
                    Ok(message) => {
                        // Only fails once the handler is gone, i.e. during shutdown
                        let _ = message_tx.send(message);
                    }
                    Err(e) => warn!("[Transport] Dropping frame: {}", e),
                }
            }

            cmd = command_rx.recv() => {
                match cmd {
                    Some(ClientCommand::Shutdown) | None => {
                        info!("[Transport] Received shutdown command");
                        state.set(ConnectionState::ShuttingDown);
                        let _ = write.close().await;
                        return Ok(());
                    }
                }
            }
        }
    }
}
