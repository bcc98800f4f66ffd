//! Cart snapshots across restarts, corruption, and session changes.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::fs;
use std::num::NonZeroU32;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use tokoku_cart::{
    CartEvents, CartStore, FileStorage, Hydration, LineKey, SessionAuthGate, SnapshotStorage,
};
use tokoku_core::ProductId;
use tokoku_integration_tests::{CART_KEY, catalog, product, shopper};

fn signed_in() -> SessionAuthGate {
    let auth = SessionAuthGate::default();
    auth.sign_in(shopper());
    auth
}

fn open(storage: &FileStorage, auth: SessionAuthGate) -> CartStore<FileStorage, SessionAuthGate> {
    CartStore::open(storage.clone(), auth, CartEvents::default(), CART_KEY)
}

#[test]
fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    let products = catalog();

    {
        let mut cart = open(&storage, signed_in());
        assert_eq!(cart.hydration(), &Hydration::Empty);
        cart.add_line(products[0].clone(), NonZeroU32::new(3).unwrap(), Some("M"), Some("navy"));
        cart.add_line(products[1].clone(), NonZeroU32::MIN, None, None);
        cart.add_line(products[3].clone(), NonZeroU32::new(2).unwrap(), Some(""), None);
    }

    let cart = open(&storage, signed_in());
    assert_eq!(
        cart.hydration(),
        &Hydration::Restored {
            lines: 3,
            repaired: 0
        }
    );
    assert_eq!(cart.count(), 6);
    // 3 * 90_000 + 0 + 2 * 12_500
    assert_eq!(cart.total(), Decimal::from(295_000));
    assert_eq!(cart.lines()[0].selected_size.as_deref(), Some("M"));
    assert_eq!(cart.lines()[2].selected_size, None);
}

#[test]
fn test_restored_cart_keeps_merging() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());

    {
        let mut cart = open(&storage, signed_in());
        cart.add_line(product(7, 1_000), NonZeroU32::MIN, Some("L"), None);
    }

    let mut cart = open(&storage, signed_in());
    cart.add_line(product(7, 1_000), NonZeroU32::new(4).unwrap(), Some("L"), Some(""));
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.lines()[0].quantity, 5);
}

#[test]
fn test_snapshot_uses_catalog_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());

    let mut cart = open(&storage, signed_in());
    cart.add_line(catalog()[0].clone(), NonZeroU32::new(2).unwrap(), Some("M"), None);

    let raw = storage.read(CART_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let line = &value[0];
    assert_eq!(line["quantity"], 2);
    assert_eq!(line["selectedSize"], "M");
    assert!(line.get("selectedColor").is_none());
    assert_eq!(line["product"]["id"], 1);
    assert_eq!(line["product"]["discount"]["type"], "percentage");
}

#[test]
fn test_corrupt_snapshot_is_replaced_on_next_change() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    let path = storage.path_for(CART_KEY).unwrap();
    fs::write(&path, "{not json").unwrap();

    let mut cart = open(&storage, signed_in());
    assert!(matches!(cart.hydration(), Hydration::Corrupted { .. }));
    assert!(cart.is_empty());

    // Opening alone leaves the bad file in place.
    assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");

    cart.add_line(product(1, 10), NonZeroU32::MIN, None, None);
    let reopened = open(&storage, signed_in());
    assert_eq!(reopened.len(), 1);
    assert!(matches!(reopened.hydration(), Hydration::Restored { .. }));
}

#[test]
fn test_hand_edited_snapshot_is_repaired() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    storage
        .write(
            CART_KEY,
            r#"[
                {"product": {"id": 1, "name": "A", "price": "10"}, "quantity": 2, "selectedSize": "M"},
                {"product": {"id": 2, "name": "B", "price": "5"}, "quantity": 0},
                {"product": {"id": 1, "name": "A", "price": "10"}, "quantity": 3, "selectedSize": "M"}
            ]"#,
        )
        .unwrap();

    let cart = open(&storage, signed_in());
    assert_eq!(
        cart.hydration(),
        &Hydration::Restored {
            lines: 1,
            repaired: 2
        }
    );
    assert_eq!(cart.lines()[0].quantity, 5);
    assert_eq!(cart.total(), Decimal::from(50));
}

#[test]
fn test_sign_out_discards_saved_cart() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    let auth = signed_in();
    let mut cart = open(&storage, auth.clone());

    cart.add_line(product(1, 10), NonZeroU32::new(2).unwrap(), None, None);
    assert!(cart.set_quantity(&LineKey::new(ProductId::new(1), None, None), 5));
    assert!(auth.sign_out().is_some());

    assert!(!cart.add_line(product(2, 10), NonZeroU32::MIN, None, None));
    assert!(cart.is_empty());
    assert!(!storage.path_for(CART_KEY).unwrap().exists());

    let reopened = open(&storage, signed_in());
    assert_eq!(reopened.hydration(), &Hydration::Empty);
}

#[test]
fn test_expired_session_discards_saved_cart() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    let auth = SessionAuthGate::new(Duration::hours(2));
    auth.sign_in_at(shopper(), Utc::now() - Duration::hours(1));

    let mut cart = open(&storage, auth.clone());
    assert!(cart.add_line(product(1, 10), NonZeroU32::MIN, None, None));
    assert!(storage.read(CART_KEY).unwrap().is_some());

    // The same sign-in, now older than the session lifetime.
    auth.sign_in_at(shopper(), Utc::now() - Duration::hours(3));
    assert!(cart.check_session());
    assert!(cart.is_empty());
    assert_eq!(storage.read(CART_KEY).unwrap(), None);
}

#[test]
fn test_expired_session_refuses_add() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    let auth = SessionAuthGate::new(Duration::hours(2));
    auth.sign_in_at(shopper(), Utc::now() - Duration::hours(3));

    let mut cart = open(&storage, auth.clone());
    assert!(!cart.add_line(product(1, 10), NonZeroU32::MIN, None, None));
    assert!(cart.is_empty());
    assert_eq!(storage.read(CART_KEY).unwrap(), None);

    auth.sign_in(shopper());
    assert!(cart.add_line(product(1, 10), NonZeroU32::MIN, None, None));
}

#[test]
fn test_separate_slots_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());

    let mut first = CartStore::open(storage.clone(), signed_in(), CartEvents::default(), "cart_a");
    let mut second = CartStore::open(storage.clone(), signed_in(), CartEvents::default(), "cart_b");
    first.add_line(product(1, 10), NonZeroU32::MIN, None, None);
    second.add_line(product(2, 10), NonZeroU32::MIN, None, None);
    second.clear();

    let first = CartStore::open(storage.clone(), signed_in(), CartEvents::default(), "cart_a");
    let second = CartStore::open(storage, signed_in(), CartEvents::default(), "cart_b");
    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(second.hydration(), &Hydration::Restored { lines: 0, repaired: 0 });
}
