//! Tokoku Core - Shared types library.
//!
//! This crate provides common types used across all Tokoku components:
//! - `cart` - Client-side shopping cart store
//! - `cli` - Command-line tools for inspecting and editing a cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, discounts, and product snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
