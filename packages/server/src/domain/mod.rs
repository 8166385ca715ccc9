//! Domain layer for the chat relay.
//!
//! This module contains the relay's models and the traits for the external
//! collaborators (session registry, counter store, broadcast bus). It is
//! independent of DTOs and of the concrete Redis / in-memory backends.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use entity::{BusEvent, ChatMessage, ClientSession};
pub use error::{BusError, RegistryError, StoreError, ValueObjectError};
pub use factory::{ChatMessageFactory, SessionIdFactory};
pub use repository::{BroadcastBus, CounterStore, SessionRepository};
pub use value_object::{BusChannel, ConnectionCount, MessageId, MessageText, SessionId};
