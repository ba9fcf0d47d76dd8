//! Catalog product and cart line types.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product in the live catalog.
///
/// Only `stock` ever changes at runtime, and only through a successful
/// purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Units on hand.
    pub stock: u32,
    /// Image URL.
    pub image: String,
    /// Display category (e.g. "Tech", "Hardware").
    pub category: String,
}

/// One line of a client-held cart, submitted with a purchase.
///
/// Clients send the whole cart item; fields other than `id`, `quantity`
/// and `name` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product being bought.
    pub id: ProductId,
    /// Units requested.
    pub quantity: u32,
    /// Name the client displayed for this line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CartLine {
    /// Create a cart line without a display name.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity,
            name: None,
        }
    }

    /// Label used when reporting a problem with this line.
    ///
    /// Falls back to the product ID when the client sent no usable name.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.id.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_line_ignores_extra_fields() {
        let json = r#"{
            "id": "2",
            "name": "Neural Link V2",
            "price": 1499.0,
            "stock": 5,
            "category": "Cyber",
            "quantity": 2
        }"#;
        let line: CartLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.id.as_str(), "2");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.label(), "Neural Link V2");
    }

    #[test]
    fn test_cart_line_rejects_negative_quantity() {
        let result: Result<CartLine, _> = serde_json::from_str(r#"{"id":"1","quantity":-3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let mut line = CartLine::new("7", 1);
        assert_eq!(line.label(), "7");
        line.name = Some("   ".to_string());
        assert_eq!(line.label(), "7");
    }

    #[test]
    fn test_product_wire_shape() {
        let product = Product {
            id: ProductId::new("3"),
            name: "HyperDrive SSD".to_string(),
            price: Price::from_cents(29_950).unwrap(),
            stock: 154,
            image: "https://example.com/ssd.jpg".to_string(),
            category: "Hardware".to_string(),
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["id"], "3");
        assert_eq!(json["stock"], 154);
        assert!(json["price"].is_number());
        assert_eq!(json["category"], "Hardware");
    }
}
