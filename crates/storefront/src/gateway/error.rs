//! Gateway error types.

use thiserror::Error;

use super::hub::ConnectionId;
use crate::catalog::CatalogError;

/// Gateway error type.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog store error.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Client not registered with the hub.
    #[error("Client not found: {0}")]
    ClientNotFound(ConnectionId),

    /// Client's outbound buffer is full; the frame was dropped.
    #[error("Outbound buffer full for client {0}")]
    BufferFull(ConnectionId),

    /// Client's outbound channel is closed.
    #[error("Channel closed for client {0}")]
    ChannelClosed(ConnectionId),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
