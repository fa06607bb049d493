//! Store adapter shared by the blocking and async pipelines
//!
//! Both pipelines talk to the persistent store through [`CacheStore`]. The
//! trait is deliberately synchronous: the async pipeline reaches it from
//! `spawn_blocking`, the blocking pipeline calls it inline.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

use chrono::Utc;

use super::storage::{CacheStats, CacheStorage, ClearStats};
use crate::error::CacheError;

type Result<T> = std::result::Result<T, CacheError>;

/// A persisted response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Derived request key
    pub key: String,
    /// Raw response body text
    pub body: String,
    /// Write time, Unix epoch milliseconds
    pub written_at: i64,
}

/// Keyed get/upsert access to a persistent store.
///
/// Implementations must be safe for concurrent readers and writers; a single
/// `get` or `put` is atomic for its key. Concurrent writers to the same key
/// are last-writer-wins.
pub trait CacheStore: Send + Sync {
    /// Fetch the entry stored under `key`
    fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Insert or overwrite the entry for `key`
    fn put(&self, key: &str, body: &str) -> Result<()>;
}

/// [`CacheStore`] over the SQLite [`CacheStorage`].
///
/// The connection is not `Sync`, so it lives behind a mutex.
pub struct SqliteStore {
    storage: Mutex<CacheStorage>,
}

impl SqliteStore {
    pub fn new(storage: CacheStorage) -> Self {
        Self {
            storage: Mutex::new(storage),
        }
    }

    pub fn open_at(cache_dir: &Path) -> Result<Self> {
        CacheStorage::open_at(cache_dir).map(Self::new)
    }

    fn with_storage<T>(&self, f: impl FnOnce(&CacheStorage) -> Result<T>) -> Result<T> {
        let guard = self
            .storage
            .lock()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        f(&*guard)
    }

    pub fn delete(&self, key: &str) -> Result<bool> {
        self.with_storage(|s| s.delete_by_key(key))
    }

    pub fn clear_all(&self) -> Result<ClearStats> {
        self.with_storage(CacheStorage::clear_all)
    }

    pub fn stats(&self) -> Result<CacheStats> {
        self.with_storage(CacheStorage::stats)
    }
}

impl CacheStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        self.with_storage(|s| s.get(key))
    }

    fn put(&self, key: &str, body: &str) -> Result<()> {
        self.with_storage(|s| s.put(key, body))
    }
}

/// Non-persistent [`CacheStore`] backed by a map
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        self.entries
            .read()
            .map(|e| e.len())
            .map_err(|e| CacheError::Unavailable(e.to_string()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, body: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        entries.insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                body: body.to_string(),
                written_at: Utc::now().timestamp_millis(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_sqlite_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open_at(dir.path()).unwrap();

        store.put("k", r#"{"code":1}"#).unwrap();

        let entry = store.get("k").unwrap().unwrap();
        assert_eq!(entry.body, r#"{"code":1}"#);
        assert_eq!(store.stats().unwrap().total_entries, 1);

        assert!(store.delete("k").unwrap());
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_upsert() {
        let store = MemoryStore::new();
        assert!(store.is_empty().unwrap());

        store.put("k", "one").unwrap();
        store.put("k", "two").unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get("k").unwrap().unwrap().body, "two");
    }

    #[test]
    fn test_memory_store_poisoned_lock_is_unavailable() {
        let store = Arc::new(MemoryStore::new());
        store.put("k", "v").unwrap();

        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(CacheError::Unavailable(_))));
        assert!(store.is_empty().is_err());
        assert!(matches!(store.get("k"), Err(CacheError::Unavailable(_))));
    }

    #[test]
    fn test_sqlite_store_concurrent_writers() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::open_at(dir.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.put("shared", &format!("writer-{}", i)).unwrap();
                    store.put(&format!("own-{}", i), "x").unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let body = store.get("shared").unwrap().unwrap().body;
        assert!(body.starts_with("writer-"));
        assert_eq!(store.stats().unwrap().total_entries, 9);
    }
}
