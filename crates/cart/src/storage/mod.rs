//! Durable storage for the cart snapshot.
//!
//! Storage is a set of named slots holding serialized text. The cart store
//! owns its slot: it reads it once at startup and overwrites it after every
//! change.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::sync::Arc;

use thiserror::Error;

/// Errors from a snapshot storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The slot name cannot be used by this backend.
    #[error("invalid storage key {0:?}: use letters, digits, '-' or '_'")]
    InvalidKey(String),

    /// Reading or writing the backing medium failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A named-slot text store.
pub trait SnapshotStorage {
    /// Read a slot. `Ok(None)` means the slot was never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key is invalid or the medium fails.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot's contents wholesale.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key is invalid or the medium fails.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a slot. Deleting an absent slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key is invalid or the medium fails.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: SnapshotStorage + ?Sized> SnapshotStorage for &T {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: SnapshotStorage + ?Sized> SnapshotStorage for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Check that `key` is usable as a slot name.
///
/// # Errors
///
/// Returns `StorageError::InvalidKey` unless `key` is non-empty and made of
/// ASCII letters, digits, `-` and `_`.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}
