//! Tokoku Cart - Persisted shopping cart store.
//!
//! The cart is the only stateful piece of the storefront client. It keeps an
//! ordered list of lines, writes a full snapshot to durable storage after
//! every change, and tells subscribers when something changed.
//!
//! # Collaborators
//!
//! - [`auth::AuthGate`] - who is signed in; adding to the cart needs a user
//! - [`storage::SnapshotStorage`] - where the snapshot lives
//! - [`events::CartEvents`] - who gets told about changes
//!
//! Pricing comes from [`tokoku_core::effective_price`].
//!
//! # Example
//!
//! ```rust
//! use std::num::NonZeroU32;
//!
//! use rust_decimal::Decimal;
//! use tokoku_cart::auth::SessionAuthGate;
//! use tokoku_cart::events::CartEvents;
//! use tokoku_cart::storage::MemoryStorage;
//! use tokoku_cart::store::CartStore;
//! use tokoku_core::{Email, Product, ProductId, UserId};
//! use tokoku_cart::auth::User;
//!
//! let auth = SessionAuthGate::default();
//! auth.sign_in(User::new(UserId::new(1), Email::parse("ana@toko.id").unwrap()));
//!
//! let mut cart = CartStore::open(MemoryStorage::default(), auth, CartEvents::default(), "cart");
//! let shirt = Product::new(ProductId::new(7), "Shirt", Decimal::from(150_000));
//!
//! assert!(cart.add_line(shirt, NonZeroU32::MIN, Some("M"), None));
//! assert_eq!(cart.count(), 1);
//! assert_eq!(cart.total(), Decimal::from(150_000));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod events;
pub mod line;
pub mod storage;
pub mod store;

pub use auth::{AuthGate, SessionAuthGate, User};
pub use config::{CartConfig, ConfigError};
pub use events::{CartEvent, CartEvents, CartSubscription};
pub use line::{CartLine, CheckoutItem, LineKey};
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage, StorageError};
pub use store::{CartStore, Hydration};
