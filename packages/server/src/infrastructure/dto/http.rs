//! HTTP API response DTOs for the chat relay.

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub port: u16,
}

impl HealthDto {
    /// Healthy response for an instance listening on `port`
    pub fn ok(port: u16) -> Self {
        Self {
            status: "ok".to_string(),
            port,
        }
    }
}
