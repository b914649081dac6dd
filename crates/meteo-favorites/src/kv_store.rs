//! Key-value storage backend trait.
//!
//! Favorites are persisted as one record under a fixed key. The trait keeps the
//! in-memory logic independent of where that record lives (a file on disk in
//! the application, a map in tests).

use meteo_core::StorageError;

/// Result type for storage backend operations.
pub type StoreResult<T> = Result<T, StorageError>;

/// A tiny synchronous key-value store of string records.
pub trait KeyValueStore: Send {
    /// Read the record stored under `key`.
    ///
    /// Returns `None` if nothing has been stored yet.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace the record under `key`.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete the record under `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<S: KeyValueStore + Sync> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

/// Keys double as file names, so only a conservative alphabet is allowed.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(StorageError::write(key, "invalid key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("favorites").is_ok());
        assert!(validate_key("recent-cities_2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a b").is_err());
    }
}
