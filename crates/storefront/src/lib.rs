//! Aether storefront backend library.
//!
//! Live catalog server for the Aether storefront: a WebSocket session
//! gateway that keeps every connected client's view of stock levels in
//! sync, plus a small HTTP surface for health checks and one-off reads.
//!
//! The binary in `main.rs` only wires configuration, logging and Sentry
//! around [`routes::app`], so everything here can be served in-process by
//! tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod routes;
pub mod state;
