//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use chat_relay_shared::time::now_utc;

use crate::{
    domain::{ClientSession, SessionId, SessionIdFactory},
    infrastructure::dto::websocket::ClientFrame,
    ui::state::AppState,
    usecase::{AttachSessionUseCase, DetachError, DetachSessionUseCase, SendMessageUseCase},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = SessionIdFactory::generate();

    // Create a channel for this session to receive fanned-out frames
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let session = ClientSession::new(session_id, now_utc(), tx);

    // Use AttachSessionUseCase to register the session and announce the new count
    let attach_usecase = AttachSessionUseCase::new(
        state.sessions.clone(),
        state.counter.clone(),
        state.bus.clone(),
    );
    if let Err(e) = attach_usecase.execute(session).await {
        tracing::error!("Failed to register session '{}': {}", session_id, e);
        return;
    }

    let (mut sender, mut receiver) = socket.split();
    let send_usecase = SendMessageUseCase::new(state.bus.clone());

    // Spawn a task to receive frames from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on session '{}': {}", session_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_client_text(&send_usecase, &session_id, text.as_str()).await;
                }
                Message::Close(_) => {
                    tracing::debug!("Session '{}' requested close", session_id);
                    break;
                }
                // Ping/pong is handled by the WebSocket protocol layer
                _ => {}
            }
        }
    });

    // Spawn a task to forward fanned-out frames to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        // The registry released this session (shutdown), close the socket
        let _ = sender.send(Message::Close(None)).await;
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Use DetachSessionUseCase to unregister the session and announce the new count
    let detach_usecase = DetachSessionUseCase::new(
        state.sessions.clone(),
        state.counter.clone(),
        state.bus.clone(),
    );
    if let Err(DetachError::NotAttached(_)) = detach_usecase.execute(&session_id).await {
        tracing::debug!("Session '{}' was already released", session_id);
    }
}

/// Handle one text frame from a client.
///
/// Malformed frames, unknown events and empty messages are ignored without
/// notifying the client. Publish failures are logged here so they never
/// reach other sessions.
async fn handle_client_text(usecase: &SendMessageUseCase, session_id: &SessionId, text: &str) {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!("Ignoring malformed frame from '{}': {}", session_id, e);
            return;
        }
    };

    if !frame.is_new_message() {
        tracing::debug!("Ignoring '{}' event from '{}'", frame.event, session_id);
        return;
    }

    if let Err(e) = usecase.execute(session_id, frame.message_text()).await {
        tracing::error!("Failed to publish message from '{}': {}", session_id, e);
    }
}
