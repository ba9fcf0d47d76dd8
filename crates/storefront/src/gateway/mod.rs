//! Session gateway: live catalog updates over WebSocket.
//!
//! # Flow
//!
//! ```text
//! client connects ──► inventory_init (snapshot, this client only)
//! client purchase ──► catalog check-and-commit
//!                     ├─► inventory_update (every client)
//!                     └─► ack (requester)
//! client register ──► ack (requester)
//! client login    ──► ack (requester)
//! every period    ──► live_activity (every client, cosmetic)
//! ```
//!
//! # Modules
//!
//! - [`protocol`] - JSON frame types
//! - [`hub`] - Connected clients and fan-out
//! - [`activity`] - Periodic live activity feed
//! - `service` - Request dispatch ([`Gateway`])
//! - `session` - Per-connection socket loop

pub mod activity;
pub mod error;
pub mod hub;
pub mod protocol;
mod service;
mod session;

pub use error::GatewayError;
pub use hub::{ConnectionId, Hub};
pub use service::Gateway;
pub use session::ws_handler;
