// Connection registry that fans session notifications out to live sockets.

use crate::domain::ConnectionId;
use crate::interface_adapters::protocol::ServerMessage;
use crate::use_cases::{Broadcaster, Notification};
use async_trait::async_trait;
use axum::extract::ws::{Message, Utf8Bytes};
use std::collections::HashMap;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, error, warn};

/// Outbound frame queue for a single connection.
pub type OutboundTx = mpsc::Sender<Message>;

/// Tracks every connected socket, joined or not.
#[derive(Debug, Default)]
pub struct ConnectionHub {
    connections: RwLock<HashMap<ConnectionId, OutboundTx>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, conn_id: ConnectionId, tx: OutboundTx) {
        self.connections.write().await.insert(conn_id, tx);
    }

    /// Returns true if the connection was registered.
    pub async fn unregister(&self, conn_id: ConnectionId) -> bool {
        self.connections.write().await.remove(&conn_id).is_some()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

// Serialize once; every recipient gets a clone of the shared bytes.
fn encode(notification: &Notification) -> Option<Utf8Bytes> {
    let msg = ServerMessage::from(notification);
    match serde_json::to_string(&msg) {
        Ok(txt) => Some(Utf8Bytes::from(txt)),
        Err(e) => {
            error!(error = ?e, "failed to serialize notification");
            None
        }
    }
}

fn push(conn_id: ConnectionId, tx: &OutboundTx, bytes: Utf8Bytes) {
    match tx.try_send(Message::Text(bytes)) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(conn_id, "outbound queue full; dropping notification");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            // The connection is shutting down; its disconnect path cleans up.
            debug!(conn_id, "outbound queue closed");
        }
    }
}

#[async_trait]
impl Broadcaster for ConnectionHub {
    async fn send_to_caller(&self, caller: ConnectionId, notification: &Notification) {
        let Some(bytes) = encode(notification) else {
            return;
        };
        let connections = self.connections.read().await;
        match connections.get(&caller) {
            Some(tx) => push(caller, tx, bytes),
            None => debug!(conn_id = caller, "caller no longer connected"),
        }
    }

    async fn send_to_all(&self, notification: &Notification) {
        let Some(bytes) = encode(notification) else {
            return;
        };
        let connections = self.connections.read().await;
        for (conn_id, tx) in connections.iter() {
            push(*conn_id, tx, bytes.clone());
        }
    }
}
