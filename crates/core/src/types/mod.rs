//! Core types for Tokoku.
//!
//! This module provides type-safe wrappers for common domain concepts and the
//! pricing rule applied to catalog products.

pub mod discount;
pub mod email;
pub mod id;
pub mod product;

pub use discount::{Discount, DiscountKind, effective_price};
pub use email::{Email, EmailError};
pub use id::*;
pub use product::Product;
