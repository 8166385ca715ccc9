//! Server bootstrap, serving and graceful shutdown.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::ServerConfig,
    error::ServerError,
    infrastructure::repository::{InMemorySessionRepository, RedisBroadcastBus, RedisCounterStore},
    ui::{
        handler::{health_check, websocket_handler},
        signal::shutdown_signal,
        state::AppState,
    },
    usecase::{FanOutUseCase, InitializeCounterUseCase, ShutdownUseCase},
};

/// Options for [`serve`]
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Allowed CORS origin (`*` allows any origin)
    pub cors_origin: String,
    /// Wait between the termination signal and the shutdown correction
    pub shutdown_grace: Duration,
}

impl From<&ServerConfig> for ServeOptions {
    fn from(config: &ServerConfig) -> Self {
        Self {
            cors_origin: config.cors_origin.clone(),
            shutdown_grace: config.shutdown_grace(),
        }
    }
}

/// Run the relay with Redis backends until a termination signal arrives
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let redis_url = config.redis_url()?;
    let client = ::redis::Client::open(redis_url)
        .map_err(|e| ServerError::InvalidRedisUrl(e.to_string()))?;

    let timeout = config.backend_timeout();
    let counter = RedisCounterStore::connect(client.clone(), timeout).await?;
    let bus = RedisBroadcastBus::connect(client, timeout).await?;

    let state = Arc::new(AppState::new(
        config.port,
        Arc::new(InMemorySessionRepository::new()),
        Arc::new(counter),
        Arc::new(bus),
    ));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!("Server started at http://{}", addr);

    serve(listener, state, ServeOptions::from(&config), shutdown_signal()).await
}

/// Build the HTTP router
pub fn build_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/ws", get(websocket_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the relay on `listener` until `shutdown` completes.
///
/// Bootstrap initializes the shared counter and starts the bus fan-out. After
/// `shutdown` completes the server waits the grace period, removes this
/// instance's sessions from the shared counter, stops accepting connections
/// and closes the bus.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    options: ServeOptions,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    InitializeCounterUseCase::new(state.counter.clone())
        .execute()
        .await?;
    let fan_out = spawn_fan_out(&state).await;

    let app = build_router(state.clone(), cors_layer(&options.cors_origin)?);

    let shutdown_usecase = ShutdownUseCase::new(
        state.sessions.clone(),
        state.counter.clone(),
        state.bus.clone(),
    );
    let grace = options.shutdown_grace;
    let graceful = async move {
        shutdown.await;
        tracing::info!("Shutting down in {:?}", grace);
        tokio::time::sleep(grace).await;

        match shutdown_usecase.execute().await {
            Ok(report) => tracing::info!(
                "Released {} sessions (connection count: {:?})",
                report.drained,
                report.count.map(|count| count.value())
            ),
            Err(e) => tracing::error!("Failed to correct connection count: {}", e),
        }
    };

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .await;

    if let Some(handle) = fan_out {
        handle.abort();
    }
    state.bus.close().await;
    tracing::info!("Server stopped");

    result.map_err(ServerError::Serve)
}

/// Subscribe to the bus and fan deliveries out to local sessions.
///
/// A failed subscription degrades this instance (no cross-instance updates)
/// but does not stop it.
async fn spawn_fan_out(state: &Arc<AppState>) -> Option<JoinHandle<()>> {
    match state.bus.subscribe().await {
        Ok(deliveries) => {
            let usecase = FanOutUseCase::new(state.sessions.clone(), state.port);
            Some(tokio::spawn(usecase.run(deliveries)))
        }
        Err(e) => {
            tracing::error!(
                "Failed to subscribe to the broadcast bus, this instance will not receive updates: {}",
                e
            );
            None
        }
    }
}

fn cors_layer(origin: &str) -> Result<CorsLayer, ServerError> {
    let allow_origin = if origin == "*" {
        AllowOrigin::any()
    } else {
        let value = HeaderValue::from_str(origin)
            .map_err(|_| ServerError::InvalidCorsOrigin(origin.to_string()))?;
        AllowOrigin::exact(value)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET])
        .allow_headers(Any))
}
