//! riftstore Storage - Byte Store Trait and Disk Cache
//!
//! Defines the byte-level storage abstraction the cache writes through, an
//! in-memory implementation for tests, and re-exports the cache layer
//! (key codec, expiry policy, per-type services, composite dispatcher).

pub mod cache;
pub mod services;

pub use cache::{
    CacheKey, CacheKeyBuilder, CacheStats, CompositeCache, DataSink, DataSource, DiskService,
    ExpiryPolicy, KvDiskService, LmdbByteStore, LmdbStoreError, RecordIter, Scan, StoredEntry,
    TypeHandler,
};

use riftstore_core::{CacheResult, StorageError};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// BYTE STORE TRAIT
// ============================================================================

/// Opaque key → bytes store scoped to one location.
///
/// Implementations must be safe to share across threads; concurrent puts to
/// one key are last-write-wins and never leave a partial value.
pub trait ByteStore: Send + Sync {
    /// Get the bytes stored under `key`.
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> CacheResult<()>;

    /// Delete `key`. Returns whether it existed.
    fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Snapshot of every key starting with `prefix`, in key order.
    fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>>;

    /// Delete every key in `keys`. Returns how many existed.
    fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        let mut removed = 0;
        for key in keys {
            if self.delete(key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Delete every key starting with `prefix`. Returns how many were removed.
    fn delete_prefix(&self, prefix: &str) -> CacheResult<u64> {
        let keys = self.keys_with_prefix(prefix)?;
        self.delete_many(&keys)
    }
}

// ============================================================================
// IN-MEMORY BYTE STORE
// ============================================================================

/// In-memory byte store for testing.
#[derive(Debug, Default, Clone)]
pub struct InMemoryByteStore {
    entries: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryByteStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> CacheResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn contains_key(&self, key: &str) -> CacheResult<bool> {
        Ok(self.read()?.contains_key(key))
    }

    fn read(&self) -> CacheResult<RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>>> {
        Ok(self.entries.read().map_err(|_| StorageError::LockPoisoned)?)
    }

    fn write(&self) -> CacheResult<RwLockWriteGuard<'_, BTreeMap<String, Vec<u8>>>> {
        Ok(self.entries.write().map_err(|_| StorageError::LockPoisoned)?)
    }
}

impl ByteStore for InMemoryByteStore {
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> CacheResult<()> {
        self.write()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        Ok(self.write()?.remove(key).is_some())
    }

    fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        Ok(self
            .read()?
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        let mut entries = self.write()?;
        Ok(keys.iter().filter(|key| entries.remove(*key).is_some()).count() as u64)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let store = InMemoryByteStore::new();
        assert!(store.get("a").expect("get should succeed").is_none());

        store.put("a", b"1").expect("put should succeed");
        assert_eq!(store.get("a").expect("get should succeed"), Some(b"1".to_vec()));

        assert!(store.delete("a").expect("delete should succeed"));
        assert!(!store.delete("a").expect("delete should succeed"));
        assert!(store.is_empty().expect("lock"));
    }

    #[test]
    fn test_overwrite() {
        let store = InMemoryByteStore::new();
        store.put("k", b"old").expect("put should succeed");
        store.put("k", b"new").expect("put should succeed");
        assert_eq!(store.get("k").expect("get should succeed"), Some(b"new".to_vec()));
        assert_eq!(store.len().expect("lock"), 1);
    }

    #[test]
    fn test_keys_with_prefix() {
        let store = InMemoryByteStore::new();
        for key in ["MatchDto.EUROPE.1", "MatchDto.EUROPE.2", "MatchDto.ASIA.1", "Match", "Nope.1"] {
            store.put(key, b"x").expect("put should succeed");
        }

        let keys = store
            .keys_with_prefix("MatchDto.EUROPE.")
            .expect("scan should succeed");
        assert_eq!(keys, vec!["MatchDto.EUROPE.1", "MatchDto.EUROPE.2"]);

        let all = store.keys_with_prefix("MatchDto.").expect("scan should succeed");
        assert_eq!(all.len(), 3);

        assert!(store
            .keys_with_prefix("Zzz.")
            .expect("scan should succeed")
            .is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let store = InMemoryByteStore::new();
        let handle = store.clone();
        handle.put("k", b"v").expect("put should succeed");
        assert!(store.contains_key("k").expect("lock"));
    }

    #[test]
    fn test_delete_many_and_prefix() {
        let store = InMemoryByteStore::new();
        for key in ["MatchDto.EUROPE.1", "MatchDto.EUROPE.2", "MatchDto.ASIA.1", "Nope.1"] {
            store.put(key, b"x").expect("put should succeed");
        }

        let keys = vec!["MatchDto.ASIA.1".to_string(), "MatchDto.ASIA.9".to_string()];
        assert_eq!(store.delete_many(&keys).expect("delete_many should succeed"), 1);

        assert_eq!(store.delete_prefix("MatchDto.").expect("delete_prefix should succeed"), 2);
        assert_eq!(store.keys_with_prefix("").expect("scan should succeed"), vec!["Nope.1"]);
    }

    #[test]
    fn test_poisoned_lock_surfaces_error() {
        let store = InMemoryByteStore::new();
        store.put("k", b"v").expect("put should succeed");

        let handle = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = handle.entries.write().expect("first lock");
            panic!("poison the store");
        })
        .join();

        for result in [store.len().map(|_| ()), store.contains_key("k").map(|_| ())] {
            assert!(matches!(
                result,
                Err(riftstore_core::CacheError::Storage(StorageError::LockPoisoned))
            ));
        }
        assert!(store.get("k").is_err());
    }
}
