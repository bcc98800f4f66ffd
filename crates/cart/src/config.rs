//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TOKOKU_CART_DIR` - Directory holding cart snapshots (default: `.tokoku`)
//! - `TOKOKU_CART_KEY` - Snapshot slot name (default: `cart`)
//! - `TOKOKU_EVENT_CAPACITY` - Buffered change events per subscriber (default: 16)
//! - `TOKOKU_SESSION_TTL_SECS` - Signed-in session lifetime (default: 7200)
//! - `TOKOKU_USER_ID` - ID of the signed-in shopper
//! - `TOKOKU_USER_EMAIL` - Email of the signed-in shopper (required with `TOKOKU_USER_ID`)
//! - `TOKOKU_USER_NAME` - Display name of the signed-in shopper

use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

use tokoku_core::{Email, UserId};

use crate::auth::User;
use crate::storage::validate_key;

const DEFAULT_CART_DIR: &str = ".tokoku";
const DEFAULT_CART_KEY: &str = "cart";
const DEFAULT_EVENT_CAPACITY: usize = crate::events::DEFAULT_CAPACITY;
const DEFAULT_SESSION_TTL_SECS: i64 = 2 * 60 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Directory for file-backed snapshots
    pub storage_dir: PathBuf,
    /// Snapshot slot name
    pub storage_key: String,
    /// Change notification buffer per subscriber
    pub event_capacity: usize,
    /// Lifetime of a signed-in session
    pub session_ttl: Duration,
    /// Shopper to sign in, if configured
    pub user: Option<User>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_CART_DIR),
            storage_key: DEFAULT_CART_KEY.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            user: None,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if a
    /// user ID is configured without an email.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_dir = lookup("TOKOKU_CART_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_CART_DIR), PathBuf::from);

        let storage_key =
            lookup("TOKOKU_CART_KEY").unwrap_or_else(|| DEFAULT_CART_KEY.to_string());
        validate_key(&storage_key).map_err(|e| {
            ConfigError::InvalidEnvVar("TOKOKU_CART_KEY".to_string(), e.to_string())
        })?;

        let event_capacity = match lookup("TOKOKU_EVENT_CAPACITY") {
            Some(raw) => parse_positive(&raw)
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| invalid("TOKOKU_EVENT_CAPACITY", &raw, "expected an integer >= 1"))?,
            None => DEFAULT_EVENT_CAPACITY,
        };

        let session_ttl = match lookup("TOKOKU_SESSION_TTL_SECS") {
            Some(raw) => parse_positive(&raw)
                .and_then(Duration::try_seconds)
                .ok_or_else(|| {
                    invalid("TOKOKU_SESSION_TTL_SECS", &raw, "expected seconds >= 1")
                })?,
            None => Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        };

        let user = user_from_lookup(&lookup)?;

        Ok(Self {
            storage_dir,
            storage_key,
            event_capacity,
            session_ttl,
            user,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn invalid(key: &str, raw: &str, expected: &str) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), format!("{expected} (got {raw:?})"))
}

/// Parse a strictly positive integer.
fn parse_positive(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|n| *n >= 1)
}

/// Read the configured shopper. No ID means anonymous.
fn user_from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<User>, ConfigError> {
    let Some(raw_id) = lookup("TOKOKU_USER_ID") else {
        return Ok(None);
    };
    let id = raw_id
        .parse::<UserId>()
        .map_err(|e| ConfigError::InvalidEnvVar("TOKOKU_USER_ID".to_string(), e.to_string()))?;

    let raw_email = lookup("TOKOKU_USER_EMAIL")
        .ok_or_else(|| ConfigError::MissingEnvVar("TOKOKU_USER_EMAIL".to_string()))?;
    let email = Email::parse(&raw_email)
        .map_err(|e| ConfigError::InvalidEnvVar("TOKOKU_USER_EMAIL".to_string(), e.to_string()))?;

    let user = User::new(id, email);
    Ok(Some(match lookup("TOKOKU_USER_NAME") {
        Some(name) if !name.trim().is_empty() => user.with_name(name.trim()),
        _ => user,
    }))
}
