//! Integration tests for Tokoku.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tokoku-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_model` - Randomized operation sequences checked against a reference model
//! - `cart_persistence` - Snapshots surviving restarts, corruption, and sign-out
//! - `cart_events` - Change notification across independent subscribers
//!
//! This library holds the fixtures those tests share.

#![cfg_attr(not(test), forbid(unsafe_code))]

use rust_decimal::Decimal;

use tokoku_cart::User;
use tokoku_core::{Discount, Email, Product, ProductId, UserId};

/// Storage slot used by every test store.
pub const CART_KEY: &str = "cart";

/// A signed-in shopper.
#[must_use]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
pub fn shopper() -> User {
    User::new(UserId::new(1), Email::parse("ana@toko.id").unwrap()).with_name("Ana")
}

/// A product without a discount.
#[must_use]
pub fn product(id: i32, price: i64) -> Product {
    Product::new(ProductId::new(id), format!("Product {id}"), Decimal::from(price))
}

/// A small catalog mixing discount kinds, including disabled and unknown ones.
#[must_use]
pub fn catalog() -> Vec<Product> {
    vec![
        product(1, 100_000).with_discount(Discount::percentage(Decimal::from(10))),
        product(2, 50_000).with_discount(Discount::fixed(Decimal::from(60_000))),
        product(3, 75_000).with_discount(Discount::fixed(Decimal::from(5_000)).disabled()),
        product(4, 12_500),
        product(5, 20_000).with_discount(Discount {
            enabled: true,
            kind: Some(tokoku_core::DiscountKind::Unknown),
            value: Some(Decimal::from(1_000)),
        }),
    ]
}
