//! Request dispatch between connected clients and the catalog store.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use aether_core::{Activity, CartLine};
use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use super::error::Result;
use super::hub::{ConnectionId, Hub};
use super::protocol::{
    ClientRequest, LoginRequest, PURCHASE_OK, RegisterRequest, Reply, ServerMessage,
};
use crate::catalog::{CatalogError, CatalogStore};
use crate::error::add_breadcrumb;

/// Bridges client connections to the catalog store.
///
/// Connections carry no session state: a login only returns data for the
/// client to keep.
pub struct Gateway {
    catalog: Arc<dyn CatalogStore>,
    hub: Hub,
    /// Orders connect-time snapshots against purchase broadcasts so every
    /// client sees snapshots in commit order.
    sequencer: Mutex<()>,
}

impl Gateway {
    /// Create a gateway over `catalog`, buffering `client_buffer` outbound
    /// frames per client.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>, client_buffer: usize) -> Self {
        Self {
            catalog,
            hub: Hub::new(client_buffer),
            sequencer: Mutex::new(()),
        }
    }

    /// The catalog store behind this gateway.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    /// The client registry.
    #[must_use]
    pub const fn hub(&self) -> &Hub {
        &self.hub
    }

    fn sequence(&self) -> MutexGuard<'_, ()> {
        self.sequencer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new client and queue its `inventory_init` snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or the snapshot cannot
    /// be queued; the client is not left registered.
    pub fn connect(&self) -> Result<(ConnectionId, mpsc::Receiver<Message>)> {
        let _order = self.sequence();
        let snapshot = self.catalog.snapshot()?;

        let (id, rx) = self.hub.register();
        if let Err(e) = self
            .hub
            .send_to(&id, &ServerMessage::InventoryInit(snapshot))
        {
            self.hub.unregister(&id);
            return Err(e);
        }
        Ok((id, rx))
    }

    /// Forget a client. Nothing else is held per connection.
    pub fn disconnect(&self, id: &ConnectionId) {
        self.hub.unregister(id);
    }

    /// Handle one request from `client` and send it the reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the reply cannot be queued for the client.
    pub fn handle(
        &self,
        client: &ConnectionId,
        ack: Option<u64>,
        request: ClientRequest,
    ) -> Result<()> {
        let reply = match request {
            ClientRequest::Purchase(lines) => self.purchase(client, &lines),
            ClientRequest::Register(form) => self.register(client, &form),
            ClientRequest::Login(form) => self.login(client, &form),
            ClientRequest::Ping => return self.hub.send_to(client, &ServerMessage::Pong),
        };
        self.hub
            .send_to(client, &ServerMessage::Ack(reply.with_id(ack)))
    }

    /// Buy a cart; on success every client gets the new snapshot before the
    /// requester gets its reply.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub fn purchase(&self, client: &ConnectionId, lines: &[CartLine]) -> Reply {
        let _order = self.sequence();

        match self.catalog.purchase(lines) {
            Ok(snapshot) => {
                info!(connection_id = %client, "Purchase committed");
                let connection_id = client.to_string();
                let line_count = lines.len().to_string();
                add_breadcrumb(
                    "purchase",
                    "Purchase committed",
                    Some(&[
                        ("connection_id", connection_id.as_str()),
                        ("lines", line_count.as_str()),
                    ]),
                );
                match self.hub.broadcast(&ServerMessage::InventoryUpdate(snapshot)) {
                    Ok(delivered) => debug!(delivered, "Inventory update broadcast"),
                    Err(e) => error!(error = %e, "Failed to broadcast inventory update"),
                }
                Reply::ok(PURCHASE_OK)
            }
            Err(err) => rejected(client, "purchase", &err),
        }
    }

    /// Register an identity. Replies to the requester only.
    #[instrument(skip_all)]
    pub fn register(&self, client: &ConnectionId, form: &RegisterRequest) -> Reply {
        match self.catalog.register(&form.name, &form.email) {
            Ok(identity) => {
                info!(connection_id = %client, identity_id = %identity.id, "Identity registered");
                Reply::user(identity)
            }
            Err(err) => rejected(client, "register", &err),
        }
    }

    /// Look up an identity by email. The password, if any, is not checked.
    #[instrument(skip_all)]
    pub fn login(&self, client: &ConnectionId, form: &LoginRequest) -> Reply {
        match self.catalog.login(&form.email) {
            Ok(identity) => {
                info!(connection_id = %client, identity_id = %identity.id, "Identity logged in");
                Reply::user(identity)
            }
            Err(err) => rejected(client, "login", &err),
        }
    }

    /// Broadcast a live activity event to every client.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Json` if the event cannot be serialized.
    pub fn broadcast_activity(&self, activity: Activity) -> Result<usize> {
        self.hub.broadcast(&ServerMessage::LiveActivity(activity))
    }
}

fn rejected(client: &ConnectionId, action: &str, err: &CatalogError) -> Reply {
    if err.is_validation() {
        debug!(connection_id = %client, action, reason = %err, "Request rejected");
    } else {
        warn!(connection_id = %client, action, error = %err, "Request failed");
    }
    Reply::from(err)
}
