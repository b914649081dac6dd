use std::collections::HashMap;

use parking_lot::Mutex;

use crate::kv_store::{KeyValueStore, StoreResult};

/// In-memory key-value store. Counts writes so callers can check that a
/// no-op really did not touch storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a record without counting it as a write
    pub fn with_record(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.records.lock().insert(key.to_string(), value.to_string());
        store
    }

    /// Number of `set`/`remove` calls so far
    pub fn writes(&self) -> usize {
        *self.writes.lock()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.records.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.records.lock().insert(key.to_string(), value.to_string());
        *self.writes.lock() += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.records.lock().remove(key);
        *self.writes.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_write_count() {
        let store = MemoryStore::with_record("favorites", "[]");
        assert_eq!(store.writes(), 0);
        assert_eq!(store.get("favorites").unwrap().as_deref(), Some("[]"));

        store.set("favorites", r#"["Oslo"]"#).unwrap();
        store.remove("other").unwrap();
        assert_eq!(store.writes(), 2);
        assert_eq!(store.get("favorites").unwrap().as_deref(), Some(r#"["Oslo"]"#));
    }
}
