//! CLI error type.

use std::path::PathBuf;

use thiserror::Error;

use tokoku_cart::ConfigError;

/// Errors surfaced to the shell by `tokoku`.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A product file could not be read.
    #[error("Failed to read product file {path}: {source}")]
    ProductFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON input or output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `add` was given neither a product file nor inline product fields.
    #[error("Missing product field: --{0}")]
    MissingProductField(&'static str),

    /// The cart refused the addition.
    #[error("Not signed in: set TOKOKU_USER_ID and TOKOKU_USER_EMAIL")]
    NotSignedIn,

    /// The selected line does not exist.
    #[error("No such cart line: {0}")]
    NoSuchLine(String),
}
