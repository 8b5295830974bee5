use crate::Result;
use async_trait::async_trait;
use std::fmt::Debug;

/// Data frame received from (or sent to) the WebSocket.
/// Control frames never reach this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl WsMessage {
    pub fn text(text: impl Into<String>) -> Self {
        WsMessage::Text(text.into())
    }

    /// Get the message as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WsMessage::Text(s) => Some(s),
            WsMessage::Binary(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            WsMessage::Text(s) => s.len(),
            WsMessage::Binary(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Turns raw frames into typed messages.
///
/// Called inline by the read loop, one frame at a time, so decoded messages
/// keep the order they arrived in. Keep it fast.
#[async_trait]
pub trait MessageDecoder: Send + Sync + 'static {
    type Message: Send + Debug + 'static;

    /// Decode one frame. Returning `Err` drops the frame; the connection
    /// stays up.
    async fn decode(&self, message: WsMessage) -> Result<Self::Message>;
}

/// Consumes decoded messages sequentially on a dedicated OS thread.
///
/// Errors are logged and the thread keeps processing.
pub trait MessageHandler<M>: Send + 'static
where
    M: Send + Debug + 'static,
{
    fn handle(&mut self, message: M) -> Result<()>;
}

/// Closures work as handlers
impl<M, F> MessageHandler<M> for F
where
    M: Send + Debug + 'static,
    F: FnMut(M) -> Result<()> + Send + 'static,
{
    fn handle(&mut self, message: M) -> Result<()> {
        self(message)
    }
}
