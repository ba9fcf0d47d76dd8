//! WebSocket protocol message types.
//!
//! Every frame is a JSON text message carrying an event name and a payload.
//!
//! ```text
//! client → server   {"event": "purchase", "ack": 7, "data": [{"id": "1", "quantity": 2}]}
//! server → client   {"event": "ack", "data": {"id": 7, "success": true, "message": "Purchase successful!"}}
//! server → all      {"event": "inventory_update", "data": [ ...products ]}
//! ```

use aether_core::{Activity, CartLine, Identity, Product};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;

/// Reply message for a committed purchase.
pub const PURCHASE_OK: &str = "Purchase successful!";

// ============================================================================
// Client → Server Messages
// ============================================================================

/// Raw frame sent by a client, before its payload is interpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientFrame {
    /// Which request this is.
    pub event: ClientEvent,
    /// Correlation ID echoed back in the `ack` reply.
    #[serde(default)]
    pub ack: Option<u64>,
    /// Event payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Request kinds a client may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientEvent {
    Purchase,
    Register,
    Login,
    Ping,
}

/// A fully parsed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRequest {
    /// Buy every line of a cart.
    Purchase(Vec<CartLine>),
    /// Create a new identity.
    Register(RegisterRequest),
    /// Look up an existing identity.
    Login(LoginRequest),
    /// Application-level keepalive.
    Ping,
}

/// Registration form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    /// Accepted for form compatibility; never stored or checked.
    #[serde(default)]
    pub password: Option<String>,
}

/// Login form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    /// Accepted for form compatibility; never checked.
    #[serde(default)]
    pub password: Option<String>,
}

impl ClientFrame {
    /// Interpret the payload according to the event name.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the payload has the wrong shape.
    pub fn into_request(self) -> Result<(Option<u64>, ClientRequest), serde_json::Error> {
        let request = match self.event {
            ClientEvent::Purchase => ClientRequest::Purchase(serde_json::from_value(self.data)?),
            ClientEvent::Register => ClientRequest::Register(serde_json::from_value(self.data)?),
            ClientEvent::Login => ClientRequest::Login(serde_json::from_value(self.data)?),
            ClientEvent::Ping => ClientRequest::Ping,
        };
        Ok((self.ack, request))
    }
}

/// Parse a text frame into a request.
///
/// # Errors
///
/// Returns a `serde_json::Error` for invalid JSON, an unknown event name or a
/// payload of the wrong shape.
pub fn parse_request(text: &str) -> Result<(Option<u64>, ClientRequest), serde_json::Error> {
    serde_json::from_str::<ClientFrame>(text)?.into_request()
}

// ============================================================================
// Server → Client Messages
// ============================================================================

/// Message sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full snapshot, sent once to a newly connected client.
    InventoryInit(Vec<Product>),
    /// Full snapshot, broadcast after every committed purchase.
    InventoryUpdate(Vec<Product>),
    /// Cosmetic activity feed event.
    LiveActivity(Activity),
    /// Reply to a client request.
    Ack(Reply),
    /// The client sent a frame that could not be understood.
    Error {
        /// Error message.
        message: String,
    },
    /// Reply to an application-level ping.
    Pong,
}

/// Outcome of a client request, delivered to the requester only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    /// Correlation ID from the request frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
}

impl Reply {
    /// Successful reply carrying only a message.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            id: None,
            success: true,
            message: Some(message.into()),
            user: None,
        }
    }

    /// Successful reply carrying an identity.
    #[must_use]
    pub const fn user(user: Identity) -> Self {
        Self {
            id: None,
            success: true,
            message: None,
            user: Some(user),
        }
    }

    /// Failed reply with a human-readable reason.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            id: None,
            success: false,
            message: Some(message.into()),
            user: None,
        }
    }

    /// Attach the request's correlation ID.
    #[must_use]
    pub fn with_id(mut self, id: Option<u64>) -> Self {
        self.id = id;
        self
    }
}

impl From<&CatalogError> for Reply {
    fn from(err: &CatalogError) -> Self {
        Self::failure(err.to_string())
    }
}
