//! Cart lines and their identity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tokoku_core::{Product, ProductId};

/// Normalize an optional variant attribute.
///
/// Empty strings and absence both mean "unset".
#[must_use]
pub fn normalize_variant(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

/// Identity of a cart line: product plus normalized size and color.
///
/// The cart never holds two lines with equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl LineKey {
    /// Build a key, normalizing `size` and `color`.
    #[must_use]
    pub fn new(product_id: ProductId, size: Option<&str>, color: Option<&str>) -> Self {
        Self {
            product_id,
            size: normalize_variant(size),
            color: normalize_variant(color),
        }
    }
}

/// One product + variant + quantity entry in the cart.
///
/// Serialized in the camelCase shape of the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Snapshot of the product when it was added.
    pub product: Product,
    /// Always at least 1 for lines held by a store.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
}

impl CartLine {
    /// Create a line with normalized variant attributes.
    #[must_use]
    pub fn new(product: Product, quantity: u32, size: Option<&str>, color: Option<&str>) -> Self {
        Self {
            product,
            quantity,
            selected_size: normalize_variant(size),
            selected_color: normalize_variant(color),
        }
    }

    /// Identity key of this line.
    ///
    /// Normalizes again so lines read from older snapshots that stored `""`
    /// compare equal to unset attributes.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(
            self.product.id,
            self.selected_size.as_deref(),
            self.selected_color.as_deref(),
        )
    }

    /// Whether this line has the given identity.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.product.id == key.product_id
            && normalize_variant(self.selected_size.as_deref()) == key.size
            && normalize_variant(self.selected_color.as_deref()) == key.color
    }

    /// Discounted unit price times quantity, saturating at the bounds of
    /// `Decimal`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product
            .unit_price()
            .saturating_mul(Decimal::from(self.quantity))
    }

    /// Base unit price times quantity, saturating like [`Self::line_total`].
    #[must_use]
    pub fn line_subtotal(&self) -> Decimal {
        self.product.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// A cart line as sent to the backend to open a checkout session.
///
/// Carries no prices: the backend looks them up itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
}

impl From<&CartLine> for CheckoutItem {
    fn from(line: &CartLine) -> Self {
        let key = line.key();
        Self {
            product_id: key.product_id,
            quantity: line.quantity,
            selected_size: key.size,
            selected_color: key.color,
        }
    }
}
