//! UseCase layer error definitions.

use thiserror::Error;

use crate::domain::{BusError, RegistryError, StoreError};

/// Errors while registering a newly attached session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttachError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors while detaching a session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetachError {
    /// The session was already removed (detached twice or drained at shutdown)
    #[error("Session '{0}' is not attached")]
    NotAttached(String),
}

/// Errors while publishing a client's chat message
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Errors while updating the shared count and announcing it on the bus
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CountUpdateError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Bus(#[from] BusError),
}
