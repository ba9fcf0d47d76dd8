//! In-memory catalog store.

use std::collections::HashMap;
use std::sync::RwLock;

use aether_core::{CartLine, Email, Identity, IdentityId, Product};
use chrono::Utc;

use super::{CatalogError, CatalogStore, default_products};

/// Catalog held entirely in process memory.
///
/// Products and identities sit behind separate locks: purchases never wait
/// on registrations and vice versa. Nothing is persisted.
#[derive(Debug)]
pub struct InMemoryCatalog {
    products: RwLock<Vec<Product>>,
    identities: RwLock<IdentityTable>,
}

#[derive(Debug, Default)]
struct IdentityTable {
    by_email: HashMap<String, Identity>,
    /// Last issued ID, in milliseconds since the Unix epoch.
    last_id: u64,
}

impl IdentityTable {
    /// Issue a time-derived ID that is strictly greater than any issued before.
    fn next_id(&mut self) -> IdentityId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.last_id = now.max(self.last_id.saturating_add(1));
        IdentityId::new(self.last_id.to_string())
    }
}

impl InMemoryCatalog {
    /// Create a catalog seeded with the given products and no identities.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
            identities: RwLock::new(IdentityTable::default()),
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new(default_products())
    }
}

impl CatalogStore for InMemoryCatalog {
    fn snapshot(&self) -> Result<Vec<Product>, CatalogError> {
        self.products
            .read()
            .map(|products| products.clone())
            .map_err(|_| CatalogError::Unavailable)
    }

    fn purchase(&self, lines: &[CartLine]) -> Result<Vec<Product>, CatalogError> {
        let mut products = self
            .products
            .write()
            .map_err(|_| CatalogError::Unavailable)?;

        // Quantities are summed per product so a cart listing the same
        // product twice cannot take stock below zero.
        let mut reserved: HashMap<usize, u32> = HashMap::new();
        for line in lines {
            let Some((index, product)) = products
                .iter()
                .enumerate()
                .find(|(_, product)| product.id == line.id)
            else {
                return Err(CatalogError::ProductNotFound {
                    name: line.label().to_owned(),
                });
            };

            let total = reserved.entry(index).or_insert(0);
            match total.checked_add(line.quantity) {
                Some(wanted) if wanted <= product.stock => *total = wanted,
                _ => {
                    return Err(CatalogError::InsufficientStock {
                        name: product.name.clone(),
                    });
                }
            }
        }

        for (index, quantity) in reserved {
            if let Some(product) = products.get_mut(index) {
                product.stock -= quantity;
            }
        }

        Ok(products.clone())
    }

    fn register(&self, name: &str, email: &str) -> Result<Identity, CatalogError> {
        let email = Email::parse(email)?;

        let mut table = self
            .identities
            .write()
            .map_err(|_| CatalogError::Unavailable)?;

        if table.by_email.contains_key(email.as_str()) {
            return Err(CatalogError::IdentityExists);
        }

        let identity = Identity {
            id: table.next_id(),
            name: name.to_owned(),
            email,
        };

        table
            .by_email
            .insert(identity.email.as_str().to_owned(), identity.clone());
        Ok(identity)
    }

    fn login(&self, email: &str) -> Result<Identity, CatalogError> {
        let table = self
            .identities
            .read()
            .map_err(|_| CatalogError::Unavailable)?;

        table
            .by_email
            .get(email)
            .cloned()
            .ok_or(CatalogError::IdentityNotFound)
    }

    fn identity_count(&self) -> Result<usize, CatalogError> {
        self.identities
            .read()
            .map(|table| table.by_email.len())
            .map_err(|_| CatalogError::Unavailable)
    }
}
