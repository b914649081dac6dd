//! Persistent favorite cities for Meteo.

pub mod favorites;
pub mod file_store;
pub mod kv_store;
pub mod memory_store;

pub use favorites::{AddOutcome, FavoritesError, FavoritesStore, FAVORITES_KEY};
pub use file_store::FileStore;
pub use kv_store::{KeyValueStore, StoreResult};
pub use memory_store::MemoryStore;
