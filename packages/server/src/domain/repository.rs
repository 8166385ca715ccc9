//! Traits for the relay's collaborators.
//!
//! The UseCase layer depends on these traits only. Concrete implementations
//! live in the infrastructure layer (Redis for production, in-memory for tests
//! and local runs).

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

use super::{
    BusChannel, BusEvent, ClientSession, ConnectionCount, SessionId,
    error::{BusError, RegistryError, StoreError},
};

/// Registry of the sessions attached to this instance
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Register a newly attached session
    async fn add_session(&self, session: ClientSession) -> Result<(), RegistryError>;

    /// Unregister a session, returning it
    async fn remove_session(&self, session_id: &SessionId) -> Result<ClientSession, RegistryError>;

    /// Stable copy of the currently attached sessions, used for fan-out
    async fn snapshot(&self) -> Vec<ClientSession>;

    /// Number of currently attached sessions
    async fn count_sessions(&self) -> usize;

    /// Unregister every session at once, returning them
    async fn drain_sessions(&self) -> Vec<ClientSession>;
}

/// Shared store holding the fleet-wide connected client count
///
/// Increment and decrement are atomic at the store. Callers never read,
/// modify and write the value back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Set the count to 0 if it does not exist yet.
    ///
    /// Returns `true` if this call created the value.
    async fn initialize(&self) -> Result<bool, StoreError>;

    /// Read the current count, `None` if absent
    async fn get(&self) -> Result<Option<ConnectionCount>, StoreError>;

    /// Overwrite the count
    async fn set(&self, value: ConnectionCount) -> Result<(), StoreError>;

    /// Atomically add one, returning the new count
    async fn increment(&self) -> Result<ConnectionCount, StoreError>;

    /// Atomically subtract one, returning the new count
    async fn decrement(&self) -> Result<ConnectionCount, StoreError>;

    /// Atomically subtract `amount`, returning the new count
    async fn decrement_by(&self, amount: i64) -> Result<ConnectionCount, StoreError>;
}

/// Publish/subscribe bus shared by every relay instance
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BroadcastBus: Send + Sync {
    /// Publish a payload on a channel
    async fn publish(&self, channel: BusChannel, payload: String) -> Result<(), BusError>;

    /// Subscribe to every [`BusChannel`].
    ///
    /// Deliveries arrive on the returned receiver in bus order.
    async fn subscribe(&self) -> Result<UnboundedReceiver<BusEvent>, BusError>;

    /// Stop the subscription and release connections
    async fn close(&self);
}
