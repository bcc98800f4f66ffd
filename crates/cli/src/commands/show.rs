//! Read-only cart commands: `show`, `total`, `count`, `checkout`.

use rust_decimal::Decimal;
use serde::Serialize;

use tokoku_cart::{AuthGate, CartStore, SnapshotStorage};
use tokoku_core::ProductId;

use crate::error::CliError;

/// One line as displayed.
#[derive(Debug, Serialize)]
pub struct LineView {
    pub position: usize,
    pub product_id: ProductId,
    pub name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Cart contents and totals as displayed.
#[derive(Debug, Serialize)]
pub struct CartSummary {
    pub lines: Vec<LineView>,
    pub count: u64,
    pub subtotal: Decimal,
    pub savings: Decimal,
    pub total: Decimal,
}

impl CartSummary {
    #[must_use]
    pub fn of<S: SnapshotStorage, A: AuthGate>(cart: &CartStore<S, A>) -> Self {
        let lines = cart
            .lines()
            .iter()
            .enumerate()
            .map(|(i, line)| LineView {
                position: i + 1,
                product_id: line.product.id,
                name: line.product.name.clone(),
                size: line.selected_size.clone(),
                color: line.selected_color.clone(),
                quantity: line.quantity,
                unit_price: line.product.unit_price(),
                line_total: line.line_total(),
            })
            .collect();

        Self {
            lines,
            count: cart.count(),
            subtotal: cart.subtotal(),
            savings: cart.savings(),
            total: cart.total(),
        }
    }
}

fn amount(value: Decimal) -> String {
    value.round_dp(2).normalize().to_string()
}

/// `tokoku show`
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn show<S: SnapshotStorage, A: AuthGate>(
    cart: &CartStore<S, A>,
    json: bool,
) -> Result<String, CliError> {
    let summary = CartSummary::of(cart);
    if json {
        return Ok(serde_json::to_string_pretty(&summary)?);
    }

    if summary.lines.is_empty() {
        return Ok("Cart is empty".to_string());
    }

    let mut out: Vec<String> = summary
        .lines
        .iter()
        .map(|line| {
            let variant = match (&line.size, &line.color) {
                (Some(size), Some(color)) => format!(" ({size}, {color})"),
                (Some(v), None) | (None, Some(v)) => format!(" ({v})"),
                (None, None) => String::new(),
            };
            format!(
                "{:>3}. {}{variant} x{} @ {} = {}",
                line.position,
                line.name,
                line.quantity,
                amount(line.unit_price),
                amount(line.line_total),
            )
        })
        .collect();

    out.push(format!("Items:    {}", summary.count));
    out.push(format!("Subtotal: {}", amount(summary.subtotal)));
    if !summary.savings.is_zero() {
        out.push(format!("Savings:  {}", amount(summary.savings)));
    }
    out.push(format!("Total:    {}", amount(summary.total)));
    Ok(out.join("\n"))
}

/// `tokoku total`
#[must_use]
pub fn total<S: SnapshotStorage, A: AuthGate>(cart: &CartStore<S, A>) -> String {
    amount(cart.total())
}

/// `tokoku count`
#[must_use]
pub fn count<S: SnapshotStorage, A: AuthGate>(cart: &CartStore<S, A>) -> String {
    cart.count().to_string()
}

/// `tokoku checkout`: the request body for opening a checkout session.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn checkout<S: SnapshotStorage, A: AuthGate>(
    cart: &CartStore<S, A>,
) -> Result<String, CliError> {
    let body = serde_json::json!({ "items": cart.checkout_items() });
    Ok(serde_json::to_string_pretty(&body)?)
}
