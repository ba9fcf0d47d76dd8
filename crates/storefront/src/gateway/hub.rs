//! Registry of connected clients.
//!
//! Each client owns a bounded outbound channel drained by its socket task.
//! Sends never block: a client that falls behind loses frames instead of
//! stalling the sender.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use axum::extract::ws::Message;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::{GatewayError, Result};
use super::protocol::ServerMessage;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// Connected clients and their outbound channels.
#[derive(Debug)]
pub struct Hub {
    clients: RwLock<HashMap<ConnectionId, mpsc::Sender<Message>>>,
    buffer: usize,
}

impl Hub {
    /// Create an empty hub whose clients buffer up to `buffer` frames each.
    #[must_use]
    pub fn new(buffer: usize) -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            buffer: buffer.max(1),
        }
    }

    /// Register a new client and return its ID and outbound receiver.
    pub fn register(&self) -> (ConnectionId, mpsc::Receiver<Message>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.buffer);
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
        debug!(connection_id = %id, "Client registered");
        (id, rx)
    }

    /// Remove a client. Returns `false` if it was not registered.
    pub fn unregister(&self, id: &ConnectionId) -> bool {
        let removed = self
            .clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some();
        if removed {
            debug!(connection_id = %id, "Client unregistered");
        }
        removed
    }

    /// Number of connected clients.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Send a message to one client.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::ClientNotFound` for an unknown client,
    /// `GatewayError::BufferFull` or `GatewayError::ChannelClosed` if the
    /// frame could not be queued, and `GatewayError::Json` if the message
    /// cannot be serialized.
    pub fn send_to(&self, id: &ConnectionId, msg: &ServerMessage) -> Result<()> {
        self.send_raw(id, encode(msg)?)
    }

    /// Send a raw WebSocket frame (e.g. a keepalive ping) to one client.
    ///
    /// # Errors
    ///
    /// Same as [`Hub::send_to`], minus serialization.
    pub fn send_raw(&self, id: &ConnectionId, frame: Message) -> Result<()> {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        let tx = clients.get(id).ok_or(GatewayError::ClientNotFound(*id))?;
        tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => GatewayError::BufferFull(*id),
            TrySendError::Closed(_) => GatewayError::ChannelClosed(*id),
        })
    }

    /// Send a message to every connected client.
    ///
    /// The message is serialized once. Returns how many clients it was queued
    /// for; clients with a full buffer miss it.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Json` if the message cannot be serialized.
    pub fn broadcast(&self, msg: &ServerMessage) -> Result<usize> {
        let frame = encode(msg)?;
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);

        let mut delivered = 0;
        for (id, tx) in clients.iter() {
            match tx.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(connection_id = %id, "Dropping broadcast for slow client");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(connection_id = %id, "Skipping broadcast for closing client");
                }
            }
        }
        Ok(delivered)
    }
}

fn encode(msg: &ServerMessage) -> Result<Message> {
    Ok(Message::Text(serde_json::to_string(msg)?.into()))
}
