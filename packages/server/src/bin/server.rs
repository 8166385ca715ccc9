//! Chat relay server.
//!
//! Relays chat messages and the connected client count between WebSocket
//! clients attached to any instance sharing the same Redis.
//!
//! Run with:
//! ```not_rust
//! REDIS_URL=redis://localhost:6379 cargo run --bin chat-relay-server
//! ```

use clap::Parser;

use chat_relay_server::ServerConfig;
use chat_relay_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Load .env before clap reads the environment
    let _ = dotenvy::dotenv();
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = chat_relay_server::run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
