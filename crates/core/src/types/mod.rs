//! Core types for Aether.
//!
//! This module provides type-safe wrappers for the storefront domain.

pub mod activity;
pub mod email;
pub mod id;
pub mod identity;
pub mod price;
pub mod product;

pub use activity::Activity;
pub use email::{Email, EmailError};
pub use id::*;
pub use identity::Identity;
pub use price::{Price, PriceError};
pub use product::{CartLine, Product};
