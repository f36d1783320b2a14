//! Client-side key/value stores and the development token backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::TokenSet;
use crate::storage::{KeyValueStore, StorageError, StorageKind, TokenStorage, TOKENS_KEY};

/// An in-process [`KeyValueStore`].
///
/// Used for tests and for the ephemeral login values when nothing needs to
/// survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Poisoned`] if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.entries.lock().map_err(|_| StorageError::Poisoned)?.len())
    }

    /// Returns `true` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Poisoned`] if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn take(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.remove(key))
    }
}

/// A [`KeyValueStore`] persisted as one JSON object in a file.
///
/// Every write rewrites the whole file through a sibling temp file and a
/// rename, so a crash never leaves a half-written file behind. A missing file
/// reads as empty.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, String>) -> T,
    ) -> Result<T, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.load()?;
        let result = f(&mut entries);
        self.save(&entries)?;
        Ok(result)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn take(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.update(|entries| entries.remove(key))
    }
}

/// Development token backend: the token set as JSON under
/// [`TOKENS_KEY`](crate::storage::TOKENS_KEY).
///
/// Tokens are stored unencrypted and are readable by anything with access to
/// the store. Do not use in production.
#[derive(Clone, Debug)]
pub struct LocalTokenStorage {
    store: Arc<dyn KeyValueStore>,
}

impl LocalTokenStorage {
    /// Creates a backend over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TokenStorage for LocalTokenStorage {
    async fn read(&self) -> Result<Option<TokenSet>, StorageError> {
        let Some(raw) = self.store.get(TOKENS_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(e) => {
                // A corrupt entry is no session; drop it so the next login
                // starts clean.
                tracing::warn!("Discarding unreadable stored tokens: {e}");
                self.store.remove(TOKENS_KEY)?;
                Ok(None)
            }
        }
    }

    async fn write(&self, tokens: &TokenSet) -> Result<(), StorageError> {
        let raw = serde_json::to_string(tokens)?;
        self.store.set(TOKENS_KEY, &raw)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(TOKENS_KEY)
    }

    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty().unwrap());

        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len().unwrap(), 1);

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
    }

    #[test]
    fn test_json_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = JsonFileStore::new(&path);
        assert!(store.get("missing").unwrap().is_none());
        store.set("shopify-auth-state", "abc").unwrap();
        store.set("other", "x").unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(
            reopened.get("shopify-auth-state").unwrap().as_deref(),
            Some("abc")
        );
        assert_eq!(reopened.take("other").unwrap().as_deref(), Some("x"));
        assert!(store.get("other").unwrap().is_none());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_json_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get("k"),
            Err(StorageError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_local_storage_drops_corrupt_entry() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKENS_KEY, "{broken").unwrap();

        let storage = LocalTokenStorage::new(store.clone());
        assert!(storage.read().await.unwrap().is_none());
        assert!(store.get(TOKENS_KEY).unwrap().is_none());
    }
}
