//! Server state shared by every handler.

use std::sync::Arc;

use crate::domain::{BroadcastBus, CounterStore, SessionRepository};

/// Shared application state
///
/// The counter store and bus handles are opened once at startup, shared by
/// every session, and closed at shutdown.
pub struct AppState {
    /// Listening port, reported by the health check and stamped on messages
    pub port: u16,
    /// Sessions attached to this instance
    pub sessions: Arc<dyn SessionRepository>,
    /// Fleet-wide connected client count
    pub counter: Arc<dyn CounterStore>,
    /// Pub/Sub bus shared by every instance
    pub bus: Arc<dyn BroadcastBus>,
}

impl AppState {
    pub fn new(
        port: u16,
        sessions: Arc<dyn SessionRepository>,
        counter: Arc<dyn CounterStore>,
        bus: Arc<dyn BroadcastBus>,
    ) -> Self {
        Self {
            port,
            sessions,
            counter,
            bus,
        }
    }
}
