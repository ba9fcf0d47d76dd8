//! Catalog store: products and registered identities.
//!
//! # Overview
//!
//! The store is the single source of truth for stock levels and identities.
//! It is held behind the [`CatalogStore`] trait so the gateway can be driven
//! by the in-memory implementation in production and by test doubles in tests.
//!
//! # Consistency
//!
//! A purchase is all-or-nothing across the whole cart: every line is checked
//! before any stock is decremented, and check and commit happen under one
//! write lock.

mod memory;
pub mod seed;

pub use memory::InMemoryCatalog;
pub use seed::{SeedError, default_products, load_products};

use aether_core::{CartLine, EmailError, Identity, Product};
use thiserror::Error;

/// Errors returned by catalog operations.
///
/// Every variant except [`CatalogError::Unavailable`] is a validation failure
/// that is reported back to the requesting client verbatim.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A cart line references a product that does not exist.
    #[error("{name} is not available")]
    ProductNotFound {
        /// Display label of the failing cart line.
        name: String,
    },

    /// A cart line asks for more units than are in stock.
    #[error("Insufficient stock for {name}")]
    InsufficientStock {
        /// Catalog name of the product.
        name: String,
    },

    /// An identity with this email is already registered.
    #[error("Identity already exists in the Aether.")]
    IdentityExists,

    /// No identity is registered with this email.
    #[error("Identity not found.")]
    IdentityNotFound,

    /// The email address is malformed.
    #[error("Invalid email address")]
    InvalidEmail(#[from] EmailError),

    /// The store's internal state is unusable (poisoned lock).
    #[error("Catalog unavailable")]
    Unavailable,
}

impl CatalogError {
    /// Whether this error is the caller's fault rather than the server's.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// Storage for the product catalog and the identity list.
pub trait CatalogStore: Send + Sync {
    /// Current products, in seed order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Unavailable` if the store cannot be read.
    fn snapshot(&self) -> Result<Vec<Product>, CatalogError>;

    /// Buy every line of a cart, or nothing.
    ///
    /// On success, returns the snapshot taken right after the commit.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` or
    /// `CatalogError::InsufficientStock` for the first failing line, in cart
    /// order. Stock is unchanged on any error.
    fn purchase(&self, lines: &[CartLine]) -> Result<Vec<Product>, CatalogError>;

    /// Register a new identity.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidEmail` for a malformed address and
    /// `CatalogError::IdentityExists` if the exact address is taken.
    fn register(&self, name: &str, email: &str) -> Result<Identity, CatalogError>;

    /// Look up an identity by exact email.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::IdentityNotFound` if no identity has this email.
    fn login(&self, email: &str) -> Result<Identity, CatalogError>;

    /// Number of registered identities.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Unavailable` if the store cannot be read.
    fn identity_count(&self) -> Result<usize, CatalogError>;
}
