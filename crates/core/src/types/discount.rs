//! Product discounts and the pricing rule.
//!
//! A [`Discount`] is owned by the catalog and read-only to everything else.
//! [`effective_price`] is the single place where a base price and a discount
//! become the unit price a shopper pays.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a discount reduces the base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `value` is a percentage of the base price.
    Percentage,
    /// `value` is an absolute amount subtracted from the base price.
    Fixed,
    /// Any type the catalog sends that this client does not know.
    ///
    /// Treated as "no discount".
    #[serde(other)]
    Unknown,
}

/// Discount descriptor attached to a product.
///
/// Mirrors the catalog wire shape `{enabled, type, value}`. `type` and
/// `value` may be absent on disabled discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Whether the discount currently applies.
    pub enabled: bool,
    /// The kind of reduction.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DiscountKind>,
    /// Percentage points or absolute amount, depending on `kind`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
}

impl Discount {
    /// An enabled percentage discount.
    #[must_use]
    pub const fn percentage(value: Decimal) -> Self {
        Self {
            enabled: true,
            kind: Some(DiscountKind::Percentage),
            value: Some(value),
        }
    }

    /// An enabled fixed-amount discount.
    #[must_use]
    pub const fn fixed(value: Decimal) -> Self {
        Self {
            enabled: true,
            kind: Some(DiscountKind::Fixed),
            value: Some(value),
        }
    }

    /// The same discount with `enabled` cleared.
    #[must_use]
    pub const fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }

    /// Apply this discount to `base`.
    ///
    /// Disabled discounts, unknown kinds, and missing values leave `base`
    /// unchanged. Fixed discounts never go below zero. Percentages are not
    /// capped, so one above 100 yields a negative price.
    ///
    /// Arithmetic saturates at the bounds of `Decimal` instead of panicking.
    #[must_use]
    pub fn apply(&self, base: Decimal) -> Decimal {
        if !self.enabled {
            return base;
        }
        let Some(value) = self.value else {
            return base;
        };

        match self.kind {
            Some(DiscountKind::Percentage) => {
                base.saturating_sub(base.saturating_mul(value) / Decimal::ONE_HUNDRED)
            }
            Some(DiscountKind::Fixed) => base.saturating_sub(value).max(Decimal::ZERO),
            Some(DiscountKind::Unknown) | None => base,
        }
    }

    /// How much this discount takes off `base`.
    #[must_use]
    pub fn savings(&self, base: Decimal) -> Decimal {
        base.saturating_sub(self.apply(base))
    }
}

/// Effective unit price for a base price and an optional discount.
///
/// ```
/// use rust_decimal::Decimal;
/// use tokoku_core::{Discount, effective_price};
///
/// let base = Decimal::from(100_000);
/// assert_eq!(effective_price(base, None), base);
/// assert_eq!(
///     effective_price(base, Some(&Discount::percentage(Decimal::from(10)))),
///     Decimal::from(90_000),
/// );
/// ```
#[must_use]
pub fn effective_price(base: Decimal, discount: Option<&Discount>) -> Decimal {
    discount.map_or(base, |discount| discount.apply(base))
}
