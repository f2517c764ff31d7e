//! WebSocket connection handling
//!
//! Each connection gets an outbound mpsc queue registered with the
//! client registry; a forward task drains it into the socket while
//! the handler loop reads inbound messages. Malformed inbound JSON is
//! dropped silently and the connection stays open; unrecognized
//! message types are logged and ignored.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use wallsync_common::{ClientMessage, ProtocolError, ServerMessage};

use super::AppState;
use crate::broadcast::ClientRole;

pub const WALL_ENDPOINT: &str = "/ws/wall";
pub const TRIGGER_ENDPOINT: &str = "/ws/trigger";

/// Outbound queue depth per peer; overflow drops messages (best-effort)
const OUTBOUND_QUEUE: usize = 64;

pub async fn wall_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, ClientRole::Display))
}

pub async fn trigger_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, ClientRole::Trigger))
}

async fn handle_socket(socket: WebSocket, state: AppState, role: ClientRole) {
    let (mut sender, mut receiver) = socket.split();

    // Trigger clients get a greeting naming their endpoint
    if role == ClientRole::Trigger {
        let hello = ServerMessage::Hello {
            endpoint: TRIGGER_ENDPOINT.to_string(),
        };
        if let Ok(text) = hello.to_json() {
            if sender.send(Message::Text(text)).await.is_err() {
                return;
            }
        }
    }

    let (tx, mut rx) = mpsc::channel::<Message>(OUTBOUND_QUEUE);
    let id = state.authority.registry().add(role, tx).await;

    // Drain the outbound queue into the socket
    let forward_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        let message = match result {
            Ok(message) => message,
            Err(e) => {
                debug!(client_id = %id, "websocket error: {e}");
                break;
            }
        };
        match message {
            Message::Text(text) => match ClientMessage::from_json(&text) {
                Ok(inbound) => state.authority.dispatch(inbound).await,
                Err(ProtocolError::Malformed) => {
                    debug!(client_id = %id, "dropping malformed message");
                }
                Err(ProtocolError::Unrecognized(kind)) => {
                    warn!(client_id = %id, kind, "ignoring unrecognized message type");
                }
            },
            Message::Close(_) => break,
            // pings are answered by axum; binary is not part of the protocol
            _ => {}
        }
    }

    state.authority.registry().remove(id).await;
    forward_task.abort();
}
