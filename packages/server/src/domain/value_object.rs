//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::ValueObjectError;

/// Session identifier value object.
///
/// Identifies one attached WebSocket connection on this instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a SessionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chat message identifier value object.
///
/// Generated fresh for every fan-out, never taken from client input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Create a MessageId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message text value object.
///
/// The text a client asked to publish. Only non-empty text is ever published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    /// Create a new MessageText.
    ///
    /// # Arguments
    ///
    /// * `text` - The message text
    ///
    /// # Returns
    ///
    /// A Result containing the MessageText or an error if the text is empty
    pub fn new(text: String) -> Result<Self, ValueObjectError> {
        if text.is_empty() {
            return Err(ValueObjectError::MessageTextEmpty);
        }
        Ok(Self(text))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connected client count value object.
///
/// The fleet-wide number of attached sessions as reported by the counter
/// store. It is a signed integer because the store's DECR can go below zero
/// when instances die without running their shutdown correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionCount(i64);

impl ConnectionCount {
    /// Create a new ConnectionCount.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the inner value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Parse the plain integer string used on the wire and in the store.
    pub fn parse(text: &str) -> Result<Self, ValueObjectError> {
        text.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ValueObjectError::ConnectionCountInvalid(text.to_string()))
    }
}

impl fmt::Display for ConnectionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two fixed channels of the broadcast bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusChannel {
    /// Connected client count updates
    ConnectionCountUpdate,
    /// New chat messages
    NewMessage,
}

impl BusChannel {
    /// Every channel an instance subscribes to.
    pub const ALL: [BusChannel; 2] = [BusChannel::ConnectionCountUpdate, BusChannel::NewMessage];

    /// Channel name on the bus.
    pub const fn name(&self) -> &'static str {
        match self {
            BusChannel::ConnectionCountUpdate => "chat:connection-count-update",
            BusChannel::NewMessage => "chat:new-message",
        }
    }

    /// Look a channel up by its bus name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.name() == name)
    }
}

impl fmt::Display for BusChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
