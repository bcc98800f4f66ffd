//! Cart mutation commands.
//!
//! # Usage
//!
//! ```bash
//! # Add a product described by a catalog JSON record
//! tokoku add --product shirt.json --size M
//!
//! # Add a product inline, with a 10% discount
//! tokoku add --id 7 --name "Kemeja Batik" --price 100000 \
//!     --discount-type percentage --discount-value 10 -q 3
//!
//! # Change or remove lines, by position or by identity
//! tokoku update --line 1 -q 5
//! tokoku remove --product-id 7 --size M
//! tokoku clear
//! ```

use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

use tokoku_cart::{AuthGate, CartStore, LineKey, SnapshotStorage};
use tokoku_core::{Discount, Product, ProductId};

use crate::error::CliError;

/// Discount kinds accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiscountArg {
    Percentage,
    Fixed,
}

/// Arguments for `tokoku add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Catalog product record (JSON file)
    #[arg(long, conflicts_with_all = ["id", "name", "price"])]
    pub product: Option<PathBuf>,

    /// Product ID
    #[arg(long)]
    pub id: Option<ProductId>,

    /// Product name
    #[arg(long)]
    pub name: Option<String>,

    /// Base unit price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Discount type (overrides the product's discount)
    #[arg(long, requires = "discount_value")]
    pub discount_type: Option<DiscountArg>,

    /// Discount percentage points or amount
    #[arg(long, requires = "discount_type")]
    pub discount_value: Option<Decimal>,

    /// Number of items to add
    #[arg(short, long, default_value = "1")]
    pub quantity: NonZeroU32,

    /// Selected size
    #[arg(long)]
    pub size: Option<String>,

    /// Selected color
    #[arg(long)]
    pub color: Option<String>,
}

/// Selects one cart line, by position or by identity.
#[derive(Debug, Args)]
pub struct LineSelector {
    /// Line position as listed by `tokoku show` (starting at 1)
    #[arg(short, long, conflicts_with = "product_id", required_unless_present = "product_id")]
    pub line: Option<usize>,

    /// Product ID of the line
    #[arg(long)]
    pub product_id: Option<ProductId>,

    /// Size of the line (with --product-id)
    #[arg(long, requires = "product_id")]
    pub size: Option<String>,

    /// Color of the line (with --product-id)
    #[arg(long, requires = "product_id")]
    pub color: Option<String>,
}

impl LineSelector {
    /// Select by 1-based position.
    #[must_use]
    pub const fn position(line: usize) -> Self {
        Self {
            line: Some(line),
            product_id: None,
            size: None,
            color: None,
        }
    }

    /// Select by identity.
    #[must_use]
    pub fn key(product_id: ProductId, size: Option<&str>, color: Option<&str>) -> Self {
        Self {
            line: None,
            product_id: Some(product_id),
            size: size.map(str::to_owned),
            color: color.map(str::to_owned),
        }
    }

    fn line_key(&self) -> Option<LineKey> {
        self.product_id
            .map(|id| LineKey::new(id, self.size.as_deref(), self.color.as_deref()))
    }

    fn describe(&self) -> String {
        match (self.line, self.line_key()) {
            (Some(line), _) => format!("line {line}"),
            (None, Some(key)) => format!(
                "product {} (size {}, color {})",
                key.product_id,
                key.size.as_deref().unwrap_or("-"),
                key.color.as_deref().unwrap_or("-"),
            ),
            (None, None) => "nothing selected".to_string(),
        }
    }
}

/// Build the product for `add` from a file or inline flags.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if inline
/// fields are incomplete.
pub fn product_from_args(args: &AddArgs) -> Result<Product, CliError> {
    let mut product = if let Some(path) = &args.product {
        let raw = std::fs::read_to_string(path).map_err(|source| CliError::ProductFile {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str::<Product>(&raw)?
    } else {
        let id = args.id.ok_or(CliError::MissingProductField("id"))?;
        let price = args.price.ok_or(CliError::MissingProductField("price"))?;
        let name = args.name.clone().unwrap_or_else(|| format!("Product {id}"));
        Product::new(id, name, price)
    };

    if let (Some(kind), Some(value)) = (args.discount_type, args.discount_value) {
        product.discount = Some(match kind {
            DiscountArg::Percentage => Discount::percentage(value),
            DiscountArg::Fixed => Discount::fixed(value),
        });
    }

    Ok(product)
}

/// `tokoku add`
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` if the cart refuses the addition, or any
/// error from [`product_from_args`].
pub fn add<S: SnapshotStorage, A: AuthGate>(
    cart: &mut CartStore<S, A>,
    args: &AddArgs,
) -> Result<String, CliError> {
    let product = product_from_args(args)?;
    let name = product.name.clone();

    if !cart.add_line(
        product,
        args.quantity,
        args.size.as_deref(),
        args.color.as_deref(),
    ) {
        return Err(CliError::NotSignedIn);
    }

    tracing::info!(items = cart.count(), "Cart updated");
    Ok(format!("Added {} x {name}", args.quantity))
}

/// `tokoku remove`
///
/// # Errors
///
/// Returns `CliError::NoSuchLine` if the selector matches nothing.
pub fn remove<S: SnapshotStorage, A: AuthGate>(
    cart: &mut CartStore<S, A>,
    selector: &LineSelector,
) -> Result<String, CliError> {
    let removed = match (selector.line, selector.line_key()) {
        (Some(line), _) => line.checked_sub(1).is_some_and(|i| cart.remove_line(i)),
        (None, Some(key)) => cart.remove(&key),
        (None, None) => false,
    };

    if removed {
        Ok(format!("Removed {}", selector.describe()))
    } else {
        Err(CliError::NoSuchLine(selector.describe()))
    }
}

/// `tokoku update`
///
/// # Errors
///
/// Returns `CliError::NoSuchLine` if the selector matches nothing.
pub fn update<S: SnapshotStorage, A: AuthGate>(
    cart: &mut CartStore<S, A>,
    selector: &LineSelector,
    quantity: u32,
) -> Result<String, CliError> {
    let updated = match (selector.line, selector.line_key()) {
        (Some(line), _) => line
            .checked_sub(1)
            .is_some_and(|i| cart.update_quantity(i, quantity)),
        (None, Some(key)) => cart.set_quantity(&key, quantity),
        (None, None) => false,
    };

    if !updated {
        return Err(CliError::NoSuchLine(selector.describe()));
    }
    if quantity == 0 {
        Ok(format!("Removed {}", selector.describe()))
    } else {
        Ok(format!("Set {} to {quantity}", selector.describe()))
    }
}

/// `tokoku clear`
pub fn clear<S: SnapshotStorage, A: AuthGate>(cart: &mut CartStore<S, A>) -> String {
    let items = cart.count();
    cart.clear();
    format!("Cleared {items} item(s)")
}

/// `tokoku logout`
pub fn logout<S: SnapshotStorage, A: AuthGate>(cart: &mut CartStore<S, A>) -> String {
    let items = cart.count();
    cart.end_session();
    format!("Signed out; discarded {items} item(s)")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::io::Write;

    use tokoku_cart::{CartEvents, MemoryStorage, User};
    use tokoku_core::{Email, UserId};

    use super::*;

    type TestCart = CartStore<MemoryStorage, Option<User>>;

    fn cart(signed_in: bool) -> TestCart {
        let user = signed_in
            .then(|| User::new(UserId::new(1), Email::parse("ana@toko.id").unwrap()));
        CartStore::open(MemoryStorage::new(), user, CartEvents::default(), "cart")
    }

    fn inline(id: i32, price: i64, quantity: u32) -> AddArgs {
        AddArgs {
            product: None,
            id: Some(ProductId::new(id)),
            name: Some(format!("Item {id}")),
            price: Some(Decimal::from(price)),
            discount_type: None,
            discount_value: None,
            quantity: NonZeroU32::new(quantity).unwrap(),
            size: None,
            color: None,
        }
    }

    #[test]
    fn test_add_inline_product() {
        let mut cart = cart(true);
        let out = add(&mut cart, &inline(1, 500, 2)).unwrap();
        assert_eq!(out, "Added 2 x Item 1");
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_add_with_discount_override() {
        let mut cart = cart(true);
        let mut args = inline(1, 100_000, 3);
        args.discount_type = Some(DiscountArg::Percentage);
        args.discount_value = Some(Decimal::from(10));
        add(&mut cart, &args).unwrap();
        assert_eq!(cart.total(), Decimal::from(270_000));
    }

    #[test]
    fn test_add_from_product_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"id": 4, "name": "Socks", "price": 50000,
                "discount": {{"enabled": true, "type": "fixed", "value": 60000}}}}"#
        )
        .unwrap();

        let mut args = inline(0, 0, 1);
        args.product = Some(file.path().to_path_buf());
        args.id = None;
        args.name = None;
        args.price = None;

        let mut cart = cart(true);
        add(&mut cart, &args).unwrap();
        assert_eq!(cart.lines()[0].product.name, "Socks");
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_add_missing_file() {
        let mut args = inline(0, 0, 1);
        args.product = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(matches!(
            product_from_args(&args),
            Err(CliError::ProductFile { .. })
        ));
    }

    #[test]
    fn test_add_requires_price() {
        let mut args = inline(1, 0, 1);
        args.price = None;
        assert!(matches!(
            product_from_args(&args),
            Err(CliError::MissingProductField("price"))
        ));
    }

    #[test]
    fn test_add_signed_out_fails() {
        let mut cart = cart(false);
        assert!(matches!(
            add(&mut cart, &inline(1, 10, 1)),
            Err(CliError::NotSignedIn)
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_by_position_and_key() {
        let mut cart = cart(true);
        add(&mut cart, &inline(1, 10, 1)).unwrap();
        let mut sized = inline(2, 10, 1);
        sized.size = Some("M".to_string());
        add(&mut cart, &sized).unwrap();

        remove(&mut cart, &LineSelector::position(1)).unwrap();
        assert_eq!(cart.lines()[0].product.id, ProductId::new(2));

        assert!(matches!(
            remove(&mut cart, &LineSelector::key(ProductId::new(2), None, None)),
            Err(CliError::NoSuchLine(_))
        ));
        remove(&mut cart, &LineSelector::key(ProductId::new(2), Some("M"), None)).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_position_zero_is_no_line() {
        let mut cart = cart(true);
        add(&mut cart, &inline(1, 10, 1)).unwrap();
        assert!(matches!(
            remove(&mut cart, &LineSelector::position(0)),
            Err(CliError::NoSuchLine(_))
        ));
    }

    #[test]
    fn test_update_and_zero_removes() {
        let mut cart = cart(true);
        add(&mut cart, &inline(1, 10, 1)).unwrap();

        assert_eq!(
            update(&mut cart, &LineSelector::position(1), 4).unwrap(),
            "Set line 1 to 4"
        );
        assert_eq!(cart.count(), 4);

        update(&mut cart, &LineSelector::key(ProductId::new(1), None, None), 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_logout_discards_saved_cart() {
        let mut cart = cart(true);
        add(&mut cart, &inline(1, 10, 2)).unwrap();
        assert_eq!(logout(&mut cart), "Signed out; discarded 2 item(s)");
        assert!(cart.is_empty());
        assert_eq!(cart.storage().read("cart").unwrap(), None);
    }

    #[test]
    fn test_clear() {
        let mut cart = cart(true);
        add(&mut cart, &inline(1, 10, 3)).unwrap();
        assert_eq!(clear(&mut cart), "Cleared 3 item(s)");
        assert!(cart.is_empty());
    }
}
