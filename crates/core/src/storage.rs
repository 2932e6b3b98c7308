//! Durable Storage
//!
//! A synchronous string key/value store standing in for browser local storage. Reads and
//! writes are treated as always available; failures are reported but never block a mutation.

use std::io;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Key under which the cart line items are stored.
pub const CART_KEY: &str = "cart";

/// Key under which the last checked postal code is stored.
pub const LAST_ZIP_KEY: &str = "last_zip_code";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage i/o failed")]
    Io(#[from] io::Error),

    /// A value could not be encoded or decoded.
    #[error("stored value is not valid JSON")]
    Serialization(#[from] serde_json::Error),
}

/// String key/value storage.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key` if present.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage, used for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<FxHashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn set_get_remove() -> TestResult {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get(CART_KEY)?, None);

        storage.set(CART_KEY, "[]")?;

        assert_eq!(storage.get(CART_KEY)?.as_deref(), Some("[]"));

        storage.remove(CART_KEY)?;

        assert_eq!(storage.get(CART_KEY)?, None);

        Ok(())
    }

    #[test]
    fn shared_across_threads() -> TestResult {
        let storage = std::sync::Arc::new(MemoryStorage::new());

        let writer = {
            let storage = std::sync::Arc::clone(&storage);
            std::thread::spawn(move || storage.set(LAST_ZIP_KEY, "411001"))
        };

        writer.join().map_err(|_err| "writer thread panicked")??;

        assert_eq!(storage.get(LAST_ZIP_KEY)?.as_deref(), Some("411001"));

        Ok(())
    }

    #[test]
    fn removing_missing_key_is_fine() -> TestResult {
        MemoryStorage::new().remove(LAST_ZIP_KEY)?;

        Ok(())
    }
}
