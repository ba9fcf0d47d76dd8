//! Catalog seed data.
//!
//! The catalog starts from a fixed product list. By default this is the
//! built-in demo set; `AETHER_CATALOG_PATH` can point at a JSON array of
//! products to use instead.

use std::collections::HashSet;
use std::path::Path;

use aether_core::{Price, Product, ProductId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while loading a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The file could not be read.
    #[error("failed to read catalog seed: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid JSON product array.
    #[error("invalid catalog seed: {0}")]
    Json(#[from] serde_json::Error),

    /// Two products share an ID.
    #[error("duplicate product id in catalog seed: {0}")]
    DuplicateId(ProductId),
}

/// The built-in demo catalog.
#[must_use]
pub fn default_products() -> Vec<Product> {
    vec![
        demo_product(
            "1",
            "Quantum Core",
            Decimal::new(99_999, 2),
            12,
            "photo-1550751827-4bd374c3f58b",
            "Tech",
        ),
        demo_product(
            "2",
            "Neural Link V2",
            Decimal::new(149_900, 2),
            5,
            "photo-1518770660439-4636190af475",
            "Cyber",
        ),
        demo_product(
            "3",
            "HyperDrive SSD",
            Decimal::new(29_950, 2),
            154,
            "photo-1597872200969-2b65d56bd16b",
            "Hardware",
        ),
        demo_product(
            "4",
            "Plasmic Capacitor",
            Decimal::new(45_000, 2),
            23,
            "photo-1614729939124-032f0b56c9ce",
            "Energy",
        ),
    ]
}

fn demo_product(
    id: &str,
    name: &str,
    amount: Decimal,
    stock: u32,
    photo: &str,
    category: &str,
) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        // Seed amounts are literals above zero.
        price: Price::new(amount).unwrap_or_default(),
        stock,
        image: format!(
            "https://images.unsplash.com/{photo}?auto=format&fit=crop&q=80&w=500"
        ),
        category: category.to_string(),
    }
}

/// Load the catalog seed, from `path` when given, otherwise the built-in set.
///
/// # Errors
///
/// Returns `SeedError` if the file cannot be read or parsed, or if it lists
/// the same product ID twice.
pub fn load_products(path: Option<&Path>) -> Result<Vec<Product>, SeedError> {
    let Some(path) = path else {
        return Ok(default_products());
    };

    let raw = std::fs::read_to_string(path)?;
    let products = parse_products(&raw)?;
    tracing::info!(
        path = %path.display(),
        products = products.len(),
        "Loaded catalog seed"
    );
    Ok(products)
}

fn parse_products(raw: &str) -> Result<Vec<Product>, SeedError> {
    let products: Vec<Product> = serde_json::from_str(raw)?;

    let mut seen = HashSet::new();
    for product in &products {
        if !seen.insert(&product.id) {
            return Err(SeedError::DuplicateId(product.id.clone()));
        }
    }

    Ok(products)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_products() {
        let products = default_products();
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Quantum Core",
                "Neural Link V2",
                "HyperDrive SSD",
                "Plasmic Capacitor"
            ]
        );
        assert_eq!(products[0].stock, 12);
        assert_eq!(products[1].price.amount(), Decimal::new(1499, 0));
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        assert_eq!(load_products(None).unwrap(), default_products());
    }

    #[test]
    fn test_parse_products() {
        let raw = r#"[
            {"id": "a", "name": "Alpha", "price": 10.5, "stock": 3, "image": "a.jpg", "category": "X"}
        ]"#;
        let products = parse_products(raw).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price.amount(), Decimal::new(105, 1));
    }

    #[test]
    fn test_parse_rejects_duplicate_ids() {
        let raw = r#"[
            {"id": "a", "name": "Alpha", "price": 1, "stock": 1, "image": "", "category": ""},
            {"id": "a", "name": "Again", "price": 1, "stock": 1, "image": "", "category": ""}
        ]"#;
        assert!(matches!(
            parse_products(raw),
            Err(SeedError::DuplicateId(id)) if id.as_str() == "a"
        ));
    }

    #[test]
    fn test_parse_rejects_negative_stock() {
        let raw = r#"[{"id": "a", "name": "A", "price": 1, "stock": -1, "image": "", "category": ""}]"#;
        assert!(matches!(parse_products(raw), Err(SeedError::Json(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_products(Some(Path::new("/nonexistent/aether-seed.json")));
        assert!(matches!(result, Err(SeedError::Io(_))));
    }
}
