use std::fs;
use std::path::{Path, PathBuf};

use meteo_core::StorageError;

use crate::kv_store::{validate_key, KeyValueStore, StoreResult};

/// File-backed key-value store: one `<key>.json` file per record inside a
/// data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StorageError::write(dir.display().to_string(), e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        let path = self.record_path(key);

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::read(key, e)),
        }
    }

    /// Writes to a temporary file and renames it over the record, so a crash
    /// mid-write leaves the previous value intact.
    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        let path = self.record_path(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        fs::write(&tmp, value).map_err(|e| StorageError::write(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::write(key, e))?;

        tracing::debug!("Stored {} at {:?}", key, path);
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        let path = self.record_path(key);

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::write(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("favorites").unwrap(), None);
    }

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();

        store.set("favorites", r#"["Rome"]"#).unwrap();
        assert_eq!(store.get("favorites").unwrap().as_deref(), Some(r#"["Rome"]"#));
        assert!(dir.path().join("nested").join("favorites.json").exists());

        store.set("favorites", "[]").unwrap();
        assert_eq!(store.get("favorites").unwrap().as_deref(), Some("[]"));

        store.remove("favorites").unwrap();
        assert_eq!(store.get("favorites").unwrap(), None);
        store.remove("favorites").unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.set("../favorites", "[]").is_err());
        assert!(store.get("a/b").is_err());
    }
}
