//! Aether Core - Shared domain types.
//!
//! This crate provides the types exchanged between the Aether storefront
//! backend and its browser clients:
//! - `storefront` - Catalog store and live session gateway
//! - `integration-tests` - End-to-end tests driving the gateway
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no locking,
//! no transport. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, products, identities, activity events

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
