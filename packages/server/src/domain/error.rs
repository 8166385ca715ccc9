//! Domain layer error definitions.

use std::time::Duration;

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// MessageText validation error
    #[error("MessageText cannot be empty")]
    MessageTextEmpty,

    /// ConnectionCount parse error
    #[error("ConnectionCount must be an integer (got: {0})")]
    ConnectionCountInvalid(String),
}

/// Errors related to the local session registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A session with the same ID is already attached
    #[error("Session already registered: {0}")]
    SessionAlreadyRegistered(String),

    /// No session with this ID is attached
    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

/// Errors returned by the shared counter store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or rejected the command
    #[error("Counter store error: {0}")]
    Backend(String),

    /// The store did not answer in time
    #[error("Counter store timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors returned by the broadcast bus
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus could not be reached or rejected the command
    #[error("Broadcast bus error: {0}")]
    Backend(String),

    /// The bus did not answer in time
    #[error("Broadcast bus timed out after {0:?}")]
    Timeout(Duration),

    /// The bus has been closed by this instance
    #[error("Broadcast bus is closed")]
    Closed,
}
