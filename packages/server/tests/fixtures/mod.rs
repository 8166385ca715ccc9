//! Test fixtures: an in-process relay backed by in-memory stores, and
//! WebSocket client helpers.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use chat_relay_server::{
    ServerError,
    domain::{ConnectionCount, CounterStore, SessionRepository},
    infrastructure::repository::{
        InMemoryBroadcastBus, InMemoryCounterStore, InMemorySessionRepository,
    },
    ui::{AppState, ServeOptions, serve},
};

/// How long a test waits for an expected frame
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Relay instance running on an ephemeral port
pub struct TestServer {
    pub addr: SocketAddr,
    pub sessions: Arc<InMemorySessionRepository>,
    pub counter: Arc<InMemoryCounterStore>,
    pub bus: Arc<InMemoryBroadcastBus>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<(), ServerError>>>,
}

impl TestServer {
    /// Start a relay with a fresh counter and bus
    pub async fn start() -> Self {
        Self::start_with(InMemoryCounterStore::new(), InMemoryBroadcastBus::new()).await
    }

    /// Start a relay on the given counter and bus (share them to model a fleet)
    pub async fn start_with(counter: InMemoryCounterStore, bus: InMemoryBroadcastBus) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let sessions = Arc::new(InMemorySessionRepository::new());
        let counter = Arc::new(counter);
        let bus = Arc::new(bus);
        let state = Arc::new(AppState::new(
            addr.port(),
            sessions.clone(),
            counter.clone(),
            bus.clone(),
        ));

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let options = ServeOptions {
            cors_origin: "*".to_string(),
            shutdown_grace: Duration::from_millis(0),
        };
        let handle = tokio::spawn(serve(listener, state, options, async move {
            let _ = shutdown_rx.await;
        }));

        Self {
            addr,
            sessions,
            counter,
            bus,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Start another relay sharing this one's counter and bus
    pub async fn start_peer(&self) -> Self {
        Self::start_with(self.counter.as_ref().clone(), self.bus.peer()).await
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Open a WebSocket session
    pub async fn connect(&self) -> WsClient {
        let (ws, _) = connect_async(self.ws_url())
            .await
            .expect("Failed to connect WebSocket");
        ws
    }

    /// Current value of the shared counter
    pub async fn count(&self) -> Option<i64> {
        self.counter
            .get()
            .await
            .expect("In-memory counter never fails")
            .map(|count: ConnectionCount| count.value())
    }

    /// Number of sessions attached to this instance
    pub async fn attached(&self) -> usize {
        self.sessions.count_sessions().await
    }

    /// Wait until the shared counter reaches `expected`
    pub async fn wait_for_count(&self, expected: i64) {
        let result = tokio::time::timeout(FRAME_TIMEOUT, async {
            while self.count().await != Some(expected) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(
            result.is_ok(),
            "counter stayed at {:?}, expected {}",
            self.count().await,
            expected
        );
    }

    /// Trigger graceful shutdown and wait for the server to stop
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.handle.take() {
            Some(handle) => handle.await.expect("Server task panicked"),
            None => Ok(()),
        }
    }
}

/// Send a JSON frame
pub async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Send a chat message frame
pub async fn send_message(ws: &mut WsClient, text: &str) {
    send_json(
        ws,
        serde_json::json!({"event": "chat:new-message", "data": {"message": text}}),
    )
    .await;
}

/// Receive the next JSON frame
pub async fn next_frame(ws: &mut WsClient) -> Value {
    let result = tokio::time::timeout(FRAME_TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str::<Value>(text.as_str())
                        .expect("Server sent invalid JSON");
                }
                Some(Ok(Message::Close(_))) | None => panic!("Connection closed"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("WebSocket error: {e}"),
            }
        }
    })
    .await;
    result.expect("Timed out waiting for a frame")
}

/// Receive frames until one with `event` arrives
pub async fn next_event(ws: &mut WsClient, event: &str) -> Value {
    loop {
        let frame = next_frame(ws).await;
        if frame["event"] == event {
            return frame;
        }
    }
}

/// Receive the next connection count update and return its count
pub async fn next_count(ws: &mut WsClient) -> String {
    let frame = next_event(ws, "chat:connection-count-update").await;
    frame["data"]["count"]
        .as_str()
        .expect("count must be a string")
        .to_string()
}

/// Assert that no frame arrives within `wait`
pub async fn assert_silent(ws: &mut WsClient, wait: Duration) {
    if let Ok(Some(Ok(Message::Text(text)))) = tokio::time::timeout(wait, ws.next()).await {
        panic!("Unexpected frame: {}", text.as_str());
    }
}

/// Wait until the server closes the connection
pub async fn expect_closed(ws: &mut WsClient) {
    let result = tokio::time::timeout(FRAME_TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(result.is_ok(), "Server did not close the connection");
}
