//! Client registry and best-effort fan-out
//!
//! Connected peers are held in an explicit owned collection keyed by
//! connection id, with add-on-connect / remove-on-disconnect
//! semantics. Delivery is at-most-once and never blocks: messages go
//! out with `try_send` into each peer's outbound queue, a full queue
//! drops that copy, and a closed queue prunes the peer without
//! affecting delivery to the rest.

use axum::extract::ws::Message;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;
use wallsync_common::ServerMessage;

/// Which message channel a peer subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRole {
    /// Display surface: receives periodic state snapshots
    Display,
    /// Trigger-capable client: receives one-shot trigger/stop events
    Trigger,
}

/// Handle to one connected peer's outbound queue
#[derive(Debug)]
struct ClientHandle {
    role: ClientRole,
    sender: mpsc::Sender<Message>,
}

/// Owned collection of connected peers
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<Uuid, ClientHandle>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connected peer; returns its connection id
    pub async fn add(&self, role: ClientRole, sender: mpsc::Sender<Message>) -> Uuid {
        let id = Uuid::new_v4();
        let mut clients = self.clients.write().await;
        clients.insert(id, ClientHandle { role, sender });
        info!(client_id = %id, ?role, total = clients.len(), "client connected");
        id
    }

    /// Remove a peer (disconnect path)
    pub async fn remove(&self, id: Uuid) {
        let mut clients = self.clients.write().await;
        if clients.remove(&id).is_some() {
            info!(client_id = %id, total = clients.len(), "client disconnected");
        }
    }

    /// Number of connected peers with the given role
    pub async fn count(&self, role: ClientRole) -> usize {
        self.clients
            .read()
            .await
            .values()
            .filter(|c| c.role == role)
            .count()
    }

    /// Fan a message out to every peer with the given role
    ///
    /// Best-effort: a slow peer drops this copy, a dead peer is
    /// removed from the active set. Authority state is unaffected
    /// either way.
    pub async fn send_to(&self, role: ClientRole, message: &ServerMessage) {
        let text = match message.to_json() {
            Ok(text) => text,
            Err(e) => {
                warn!("failed to serialize outbound message: {e}");
                return;
            }
        };

        let mut dead = Vec::new();
        {
            let clients = self.clients.read().await;
            for (id, client) in clients.iter() {
                if client.role != role {
                    continue;
                }
                match client.sender.try_send(Message::Text(text.clone())) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        debug!(client_id = %id, "outbound queue full, dropping message");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        dead.push(*id);
                    }
                }
            }
        }

        if !dead.is_empty() {
            let mut clients = self.clients.write().await;
            for id in dead {
                if clients.remove(&id).is_some() {
                    info!(client_id = %id, "pruned dead client during broadcast");
                }
            }
        }
    }
}
