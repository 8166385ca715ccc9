//! Horizontally scalable WebSocket chat relay.
//!
//! Clients attach over WebSocket, publish chat messages and receive every
//! message plus the fleet-wide connected client count. Redis holds the shared
//! count and fans messages out across relay instances via Pub/Sub.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
pub mod error;

// Re-export entry points
pub use config::ServerConfig;
pub use error::ServerError;
pub use ui::run;
