//! Logging setup based on `tracing-subscriber`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for a binary.
///
/// Cargo binary names use `-` while tracing targets use the crate name with `_`,
/// so `chat-relay-server` becomes `chat_relay_server=debug,tower_http=debug`.
pub fn default_directive(bin_name: &str, default_level: &str) -> String {
    let target = bin_name.replace('-', "_");
    format!("{target}={default_level},tower_http={default_level}")
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the default directive. Calling this more
/// than once is harmless (later calls are ignored).
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(bin_name, default_level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}
