//! Catalog product snapshot.
//!
//! The backend catalog owns products. Clients keep a copy of the record as it
//! was when the shopper acted on it, so every field the catalog sends is
//! carried through, including ones this crate does not model.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::discount::{Discount, effective_price};
use super::id::ProductId;

/// A product record as delivered by the catalog API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog ID.
    pub id: ProductId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Base unit price in the currency's standard unit.
    pub price: Decimal,
    /// Optional discount descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    /// Catalog fields not modelled here (e.g. `created_at`, `voucher`).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Product {
    /// Create a product with only the fields pricing needs.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            discount: None,
            description: None,
            category: None,
            stock: None,
            images: Vec::new(),
            sizes: Vec::new(),
            colors: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Attach a discount.
    #[must_use]
    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = Some(discount);
        self
    }

    /// Unit price after the product's discount, if any.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        effective_price(self.price, self.discount.as_ref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_price_applies_discount() {
        let product = Product::new(ProductId::new(1), "Kemeja Batik", Decimal::from(100_000))
            .with_discount(Discount::percentage(Decimal::from(10)));
        assert_eq!(product.unit_price(), Decimal::from(90_000));
    }

    #[test]
    fn test_deserialize_catalog_record_keeps_unknown_fields() {
        let json = r#"{
            "id": 9,
            "name": "Tote Bag",
            "description": "Canvas",
            "price": 75000,
            "category": "bags",
            "stock": 4,
            "images": ["data:image/png;base64,AAAA"],
            "colors": ["red"],
            "created_at": "2025-01-02T03:04:05",
            "discount": {"enabled": true, "type": "fixed", "value": 5000}
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.id, ProductId::new(9));
        assert_eq!(product.unit_price(), Decimal::from(70_000));
        assert_eq!(product.colors, vec!["red".to_string()]);
        assert!(product.sizes.is_empty());
        assert_eq!(
            product.extra.get("created_at"),
            Some(&serde_json::json!("2025-01-02T03:04:05"))
        );

        let reencoded = serde_json::to_value(&product).unwrap();
        assert_eq!(reencoded["created_at"], "2025-01-02T03:04:05");
    }

    #[test]
    fn test_deserialize_requires_price() {
        assert!(serde_json::from_str::<Product>(r#"{"id": 1, "name": "x"}"#).is_err());
    }
}
