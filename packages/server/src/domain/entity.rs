//! Core domain models for the chat relay.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;

use super::value_object::{BusChannel, MessageId, SessionId};

/// One WebSocket connection attached to this instance
#[derive(Debug, Clone)]
pub struct ClientSession {
    /// Session identifier
    pub id: SessionId,
    /// Time the session was attached
    pub connected_at: DateTime<Utc>,
    /// Outbound queue drained by the session's socket writer
    pub sender: UnboundedSender<String>,
}

impl ClientSession {
    /// Create a new session
    pub fn new(id: SessionId, connected_at: DateTime<Utc>, sender: UnboundedSender<String>) -> Self {
        Self {
            id,
            connected_at,
            sender,
        }
    }

    /// Queue a serialized frame for this session.
    ///
    /// Returns `false` if the socket writer has already gone away.
    pub fn deliver(&self, frame: String) -> bool {
        self.sender.send(frame).is_ok()
    }
}

/// A chat message as fanned out to local sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Fresh identifier assigned at fan-out time
    pub id: MessageId,
    /// Message text exactly as it travelled over the bus
    pub text: String,
    /// Fan-out time on this instance
    pub created_at: DateTime<Utc>,
    /// Listening port of the instance that fanned the message out
    pub port: u16,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(id: MessageId, text: String, created_at: DateTime<Utc>, port: u16) -> Self {
        Self {
            id,
            text,
            created_at,
            port,
        }
    }
}

/// A delivery received from the broadcast bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusEvent {
    /// Channel the payload was published on
    pub channel: BusChannel,
    /// Raw payload text
    pub payload: String,
}

impl BusEvent {
    /// Create a new bus event
    pub fn new(channel: BusChannel, payload: impl Into<String>) -> Self {
        Self {
            channel,
            payload: payload.into(),
        }
    }
}
