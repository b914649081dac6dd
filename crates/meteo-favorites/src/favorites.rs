//! Bookmarked cities, persisted as a JSON list under a single key.

use meteo_core::StorageError;
use thiserror::Error;

use crate::kv_store::KeyValueStore;

/// Key of the persisted favorites record
pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("City name cannot be empty")]
    EmptyName,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl FavoritesError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyName => "City name cannot be empty.",
            Self::Storage(e) => e.user_message(),
        }
    }
}

/// What `add` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The city was already saved; nothing changed. A notice, not an error.
    AlreadyFavorite,
}

/// Ordered, duplicate-free list of favorite city names.
///
/// Every mutation is written through to the backing store before returning.
/// If the write fails the in-memory list is left as it was.
pub struct FavoritesStore<S: KeyValueStore> {
    store: S,
    cities: Vec<String>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Load favorites from `store`. A missing record is an empty list.
    ///
    /// # Errors
    /// Returns `StorageError::Corruption` if the record is not a JSON list of strings.
    pub fn load(store: S) -> Result<Self, FavoritesError> {
        let cities = match store.get(FAVORITES_KEY)? {
            Some(raw) => Self::decode(&raw)?,
            None => Vec::new(),
        };

        tracing::debug!("Loaded {} favorite cities", cities.len());
        Ok(Self { store, cities })
    }

    fn decode(raw: &str) -> Result<Vec<String>, StorageError> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let stored: Vec<String> = serde_json::from_str(raw)
            .map_err(|e| StorageError::corruption(FAVORITES_KEY, e))?;

        // Hand-edited files may repeat a city; keep the first occurrence.
        let mut cities: Vec<String> = Vec::with_capacity(stored.len());
        for city in stored {
            if !cities.contains(&city) {
                cities.push(city);
            }
        }
        Ok(cities)
    }

    fn persist(&self, cities: &[String]) -> Result<(), FavoritesError> {
        let json = serde_json::to_string(cities)
            .map_err(|e| StorageError::write(FAVORITES_KEY, e))?;
        self.store.set(FAVORITES_KEY, &json)?;
        Ok(())
    }

    /// Add `city` at the end of the list.
    ///
    /// Adding a city that is already present performs no write and returns
    /// `AddOutcome::AlreadyFavorite`.
    pub fn add(&mut self, city: &str) -> Result<AddOutcome, FavoritesError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(FavoritesError::EmptyName);
        }

        if self.contains(city) {
            tracing::debug!("{} is already a favorite", city);
            return Ok(AddOutcome::AlreadyFavorite);
        }

        let mut next = self.cities.clone();
        next.push(city.to_string());
        self.persist(&next)?;
        self.cities = next;

        tracing::info!("Added {} to favorites", city);
        Ok(AddOutcome::Added)
    }

    /// Remove `city`. Removing a city that is not present is a no-op.
    pub fn remove(&mut self, city: &str) -> Result<(), FavoritesError> {
        let city = city.trim();
        if !self.contains(city) {
            return Ok(());
        }

        let next: Vec<String> = self.cities.iter().filter(|c| *c != city).cloned().collect();
        self.persist(&next)?;
        self.cities = next;

        tracing::info!("Removed {} from favorites", city);
        Ok(())
    }

    /// Favorites in insertion order
    pub fn list(&self) -> &[String] {
        &self.cities
    }

    /// Matches the same trimmed name `add` and `remove` use
    pub fn contains(&self, city: &str) -> bool {
        let city = city.trim();
        self.cities.iter().any(|c| c == city)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Give back the backing store, e.g. to reload from it.
    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;
    use std::sync::Arc;

    fn cities(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_store_loads_empty_list() {
        let favorites = FavoritesStore::load(MemoryStore::new()).unwrap();
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut favorites = FavoritesStore::load(MemoryStore::new()).unwrap();
        assert_eq!(favorites.add("Rome").unwrap(), AddOutcome::Added);
        assert_eq!(favorites.add("Oslo").unwrap(), AddOutcome::Added);
        assert_eq!(favorites.add("Lima").unwrap(), AddOutcome::Added);
        assert_eq!(favorites.list(), cities(&["Rome", "Oslo", "Lima"]).as_slice());
    }

    #[test]
    fn test_duplicate_add_is_notice_and_no_write() {
        let store = Arc::new(MemoryStore::new());
        let mut favorites = FavoritesStore::load(store.clone()).unwrap();
        favorites.add("Rome").unwrap();
        favorites.add("Oslo").unwrap();

        let before = store.get(FAVORITES_KEY).unwrap();
        let writes = store.writes();

        assert_eq!(favorites.add("Rome").unwrap(), AddOutcome::AlreadyFavorite);
        assert_eq!(store.get(FAVORITES_KEY).unwrap(), before);
        assert_eq!(store.writes(), writes);
        assert_eq!(favorites.list(), cities(&["Rome", "Oslo"]).as_slice());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let store = Arc::new(MemoryStore::new());
        let mut favorites = FavoritesStore::load(store.clone()).unwrap();
        favorites.add("Rome").unwrap();
        let writes = store.writes();

        favorites.remove("Paris").unwrap();
        assert_eq!(favorites.list(), cities(&["Rome"]).as_slice());
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn test_remove_keeps_order_of_rest() {
        let mut favorites = FavoritesStore::load(MemoryStore::new()).unwrap();
        for city in ["Rome", "Oslo", "Lima"] {
            favorites.add(city).unwrap();
        }
        favorites.remove("Oslo").unwrap();
        assert_eq!(favorites.list(), cities(&["Rome", "Lima"]).as_slice());
    }

    #[test]
    fn test_reload_reproduces_list() {
        let store = Arc::new(MemoryStore::new());
        let mut favorites = FavoritesStore::load(store.clone()).unwrap();
        for city in ["Zürich", "Rome", "New York"] {
            favorites.add(city).unwrap();
        }
        let saved = favorites.list().to_vec();
        drop(favorites);

        let reloaded = FavoritesStore::load(store).unwrap();
        assert_eq!(reloaded.list(), saved.as_slice());
    }

    #[test]
    fn test_persisted_format_is_json_list() {
        let store = Arc::new(MemoryStore::new());
        let mut favorites = FavoritesStore::load(store.clone()).unwrap();
        favorites.add("Rome").unwrap();
        favorites.add("Oslo").unwrap();
        assert_eq!(
            store.get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["Rome","Oslo"]"#)
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut favorites = FavoritesStore::load(MemoryStore::new()).unwrap();
        assert!(matches!(favorites.add("  "), Err(FavoritesError::EmptyName)));
    }

    #[test]
    fn test_names_are_trimmed() {
        let mut favorites = FavoritesStore::load(MemoryStore::new()).unwrap();
        favorites.add(" Rome ").unwrap();
        assert_eq!(favorites.add("Rome").unwrap(), AddOutcome::AlreadyFavorite);
        assert!(favorites.contains("Rome"));
        assert!(favorites.contains(" Rome "));
        assert!(favorites.contains("Rome\n"));
        assert!(!favorites.contains("Rom"));
    }

    #[test]
    fn test_corrupted_record_is_error() {
        let store = MemoryStore::with_record(FAVORITES_KEY, r#"{"not": "a list"}"#);
        let result = FavoritesStore::load(store);
        assert!(matches!(
            result,
            Err(FavoritesError::Storage(StorageError::Corruption { .. }))
        ));
    }

    #[test]
    fn test_duplicates_in_record_collapse() {
        let store = MemoryStore::with_record(FAVORITES_KEY, r#"["Rome","Oslo","Rome"]"#);
        let favorites = FavoritesStore::load(store).unwrap();
        assert_eq!(favorites.list(), cities(&["Rome", "Oslo"]).as_slice());
    }
}
