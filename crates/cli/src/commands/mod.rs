//! `tokoku` subcommands.
//!
//! Each command works on an already hydrated [`CartStore`] and returns the
//! text to print, so commands can run against in-memory storage in tests.
//!
//! [`CartStore`]: tokoku_cart::CartStore

pub mod edit;
pub mod show;
