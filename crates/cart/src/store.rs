//! The cart store.
//!
//! [`CartStore`] owns the ordered list of cart lines and the storage slot
//! that mirrors it. All reads and writes of that slot go through the store.
//!
//! # Lifecycle
//!
//! 1. [`CartStore::new`] creates an empty, unhydrated store.
//! 2. [`CartStore::hydrate`] reads the slot once and adopts a valid
//!    snapshot. Until then nothing is written, so an empty startup cart can
//!    never clobber a saved one.
//! 3. Every mutation afterwards writes the full cart and notifies
//!    subscribers.
//! 4. When the shopper who owns the cart signs out or their session
//!    expires, [`CartStore::end_session`] discards the cart and its
//!    snapshot.
//!
//! Operations never return errors. Refusals and no-ops are reported as
//! `false`; storage problems are logged and, for hydration, recorded in
//! [`Hydration`].

use std::collections::HashMap;
use std::num::NonZeroU32;

use rust_decimal::Decimal;
use tracing::instrument;

use tokoku_core::{Product, UserId};

use crate::auth::AuthGate;
use crate::events::{CartEvents, CartSubscription};
use crate::line::{CartLine, CheckoutItem, LineKey};
use crate::storage::SnapshotStorage;

/// Outcome of loading the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration {
    /// [`CartStore::hydrate`] has not run yet.
    Pending,
    /// Nothing was stored; the cart started empty.
    Empty,
    /// A snapshot was adopted.
    Restored {
        /// Lines adopted after repair.
        lines: usize,
        /// Stored lines dropped or merged because they broke cart invariants.
        repaired: usize,
    },
    /// The stored snapshot could not be parsed; the cart started empty.
    Corrupted {
        /// Parser error message.
        reason: String,
    },
    /// The storage backend failed on read; the cart started empty.
    Unavailable {
        /// Backend error message.
        reason: String,
    },
}

/// Persisted shopping cart.
///
/// Generic over where the snapshot is stored and who is signed in, so tests
/// and the CLI can build isolated stores.
pub struct CartStore<S, A> {
    lines: Vec<CartLine>,
    storage: S,
    auth: A,
    events: CartEvents,
    key: String,
    hydration: Hydration,
    /// Shopper whose session the cart belongs to, as last seen.
    owner: Option<UserId>,
}

impl<S, A> std::fmt::Debug for CartStore<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("lines", &self.lines.len())
            .field("hydration", &self.hydration)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl<S: SnapshotStorage, A: AuthGate> CartStore<S, A> {
    /// Create an empty store that has not read its snapshot yet.
    #[must_use]
    pub fn new(storage: S, auth: A, events: CartEvents, key: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            storage,
            auth,
            events,
            key: key.into(),
            hydration: Hydration::Pending,
            owner: None,
        }
    }

    /// Create a store and hydrate it from `storage`.
    #[must_use]
    pub fn open(storage: S, auth: A, events: CartEvents, key: impl Into<String>) -> Self {
        let mut store = Self::new(storage, auth, events, key);
        store.hydrate();
        store
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Load the persisted snapshot. Runs once; later calls are no-ops.
    ///
    /// A valid snapshot replaces the in-memory lines. A missing, unreadable
    /// or corrupt one leaves them as they are. Does not notify subscribers.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn hydrate(&mut self) -> &Hydration {
        if self.is_hydrated() {
            return &self.hydration;
        }

        self.hydration = match self.storage.read(&self.key) {
            Ok(None) => {
                tracing::debug!("No saved cart");
                Hydration::Empty
            }
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartLine>>(&raw) {
                Ok(stored) => {
                    let stored_len = stored.len();
                    self.lines = repair(stored);
                    let repaired = stored_len - self.lines.len();
                    if repaired > 0 {
                        tracing::warn!(repaired, "Saved cart had invalid lines");
                    }
                    tracing::info!(lines = self.lines.len(), "Cart restored");
                    Hydration::Restored {
                        lines: self.lines.len(),
                        repaired,
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Saved cart is corrupt, starting empty");
                    Hydration::Corrupted {
                        reason: e.to_string(),
                    }
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Saved cart unreadable, starting empty");
                Hydration::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        if self.owner.is_none() {
            self.owner = self.auth.current_user().map(|user| user.id);
        }

        &self.hydration
    }

    /// Whether [`hydrate`](Self::hydrate) has run.
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        !matches!(self.hydration, Hydration::Pending)
    }

    /// What hydration found.
    #[must_use]
    pub const fn hydration(&self) -> &Hydration {
        &self.hydration
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` of `product` in the given variant.
    ///
    /// Merges into the line with the same product, size and color if there
    /// is one, otherwise appends. Empty size or color means unset.
    ///
    /// Returns `false` when nobody is signed in. If the cart's owner was
    /// signed in before, their session has ended and the cart is discarded
    /// (see [`Self::check_session`]); otherwise the cart is left untouched.
    pub fn add_line(
        &mut self,
        product: Product,
        quantity: NonZeroU32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> bool {
        self.check_session();
        if self.owner.is_none() {
            tracing::debug!(product_id = %product.id, "Add to cart refused: not signed in");
            return false;
        }

        let key = LineKey::new(product.id, size, color);
        if let Some(line) = self.lines.iter_mut().find(|line| line.matches(&key)) {
            line.quantity = line.quantity.saturating_add(quantity.get());
            tracing::debug!(
                product_id = %key.product_id,
                quantity = line.quantity,
                "Cart line merged"
            );
        } else {
            tracing::debug!(
                product_id = %key.product_id,
                quantity = quantity.get(),
                "Cart line added"
            );
            self.lines.push(CartLine {
                product,
                quantity: quantity.get(),
                selected_size: key.size,
                selected_color: key.color,
            });
        }

        self.commit();
        true
    }

    /// Remove the line at `index`.
    ///
    /// Returns `false` if there is no such line.
    pub fn remove_line(&mut self, index: usize) -> bool {
        if index >= self.lines.len() {
            tracing::debug!(index, len = self.lines.len(), "Remove ignored: no such line");
            return false;
        }

        let line = self.lines.remove(index);
        tracing::debug!(index, product_id = %line.product.id, "Cart line removed");
        self.commit();
        true
    }

    /// Set the quantity of the line at `index`. Zero removes the line.
    ///
    /// Returns `false` if there is no such line.
    pub fn update_quantity(&mut self, index: usize, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove_line(index);
        }

        let Some(line) = self.lines.get_mut(index) else {
            tracing::debug!(index, "Update ignored: no such line");
            return false;
        };

        line.quantity = quantity;
        tracing::debug!(index, quantity, "Cart line quantity updated");
        self.commit();
        true
    }

    /// Remove the line identified by `key`.
    ///
    /// Returns `false` if no line has that identity.
    pub fn remove(&mut self, key: &LineKey) -> bool {
        self.position(key)
            .is_some_and(|index| self.remove_line(index))
    }

    /// Set the quantity of the line identified by `key`. Zero removes it.
    ///
    /// Returns `false` if no line has that identity.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) -> bool {
        self.position(key)
            .is_some_and(|index| self.update_quantity(index, quantity))
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        let removed = self.lines.len();
        self.lines.clear();
        tracing::debug!(removed, "Cart cleared");
        self.commit();
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Compare the signed-in shopper with the cart's owner.
    ///
    /// If the owner signed out, their session expired, or someone else is
    /// now signed in, the cart is discarded with [`Self::end_session`].
    /// Returns whether that happened.
    pub fn check_session(&mut self) -> bool {
        let current = self.auth.current_user().map(|user| user.id);
        let ended = self.owner.is_some() && self.owner != current;
        if ended {
            tracing::info!(owner = ?self.owner, "Shopper session ended");
            self.end_session();
        }
        self.owner = current;
        ended
    }

    /// Discard the cart at the end of a shopper session (sign-out or
    /// expiry): empties it, removes the snapshot slot, and notifies.
    pub fn end_session(&mut self) {
        let removed = self.lines.len();
        self.lines.clear();
        self.owner = None;

        if let Err(e) = self.storage.remove(&self.key) {
            tracing::error!(error = %e, key = %self.key, "Failed to remove saved cart");
        }
        tracing::info!(removed, "Cart discarded");
        self.events.notify();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Position of the line identified by `key`.
    #[must_use]
    pub fn position(&self, key: &LineKey) -> Option<usize> {
        self.lines.iter().position(|line| line.matches(key))
    }

    /// The line identified by `key`.
    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(key))
    }

    /// Amount due: discounted unit prices times quantities.
    ///
    /// Amounts beyond the range of `Decimal` saturate instead of panicking.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Amount before discounts.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLine::line_subtotal)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// How much discounts take off the subtotal.
    #[must_use]
    pub fn savings(&self) -> Decimal {
        self.subtotal().saturating_sub(self.total())
    }

    /// Number of items (sum of quantities).
    #[must_use]
    pub fn count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// The cart as a checkout request payload.
    #[must_use]
    pub fn checkout_items(&self) -> Vec<CheckoutItem> {
        self.lines.iter().map(CheckoutItem::from).collect()
    }

    // =========================================================================
    // Collaborators
    // =========================================================================

    /// Subscribe to cart changes.
    #[must_use]
    pub fn subscribe(&self) -> CartSubscription {
        self.events.subscribe()
    }

    /// The publisher this store notifies.
    #[must_use]
    pub const fn events(&self) -> &CartEvents {
        &self.events
    }

    /// The storage slot name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Persist (once hydrated) and notify.
    fn commit(&self) {
        if self.is_hydrated() {
            self.persist();
        }
        self.events.notify();
    }

    fn persist(&self) {
        let snapshot = match serde_json::to_string(&self.lines) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(error = %e, key = %self.key, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.storage.write(&self.key, &snapshot) {
            tracing::error!(error = %e, key = %self.key, "Failed to save cart");
        }
    }
}

/// Restore cart invariants on a stored snapshot.
///
/// Drops zero-quantity lines, normalizes variant attributes, and merges
/// lines sharing an identity into the first one.
fn repair(stored: Vec<CartLine>) -> Vec<CartLine> {
    let mut lines: Vec<CartLine> = Vec::with_capacity(stored.len());
    let mut seen: HashMap<LineKey, usize> = HashMap::new();

    for mut line in stored {
        if line.quantity == 0 {
            continue;
        }
        let key = line.key();
        if let Some(existing) = seen.get(&key).and_then(|&i| lines.get_mut(i)) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            continue;
        }
        line.selected_size.clone_from(&key.size);
        line.selected_color.clone_from(&key.color);
        seen.insert(key, lines.len());
        lines.push(line);
    }

    lines
}
