//! LMDB-backed byte store.
//!
//! Uses the heed crate (Rust bindings for LMDB) to provide a memory-mapped,
//! directory-scoped key-value store that the disk cache writes through.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The store uses:
//! - Read transactions for `get` and key scans
//! - One write transaction per `put` and `delete`
//! - One write transaction per batch delete (`delete_many`, `delete_prefix`)
//!
//! Concurrent writers to one key are serialized by LMDB; the last commit
//! wins and readers never observe a partial value.

use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn};
use riftstore_core::{CacheError, CacheResult, StorageError};

use crate::ByteStore;

/// Error type for LMDB store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment at {path}: {reason}")]
    EnvOpen { path: PathBuf, reason: String },

    /// The requested map size does not fit in the address space.
    #[error("Map size of {max_size_mb} MB overflows usize")]
    MapSize { max_size_mb: usize },

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// A stored key is not valid UTF-8.
    #[error("Stored key is not valid UTF-8")]
    InvalidKey,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert LmdbStoreError to CacheError.
impl From<LmdbStoreError> for CacheError {
    fn from(e: LmdbStoreError) -> Self {
        CacheError::Storage(StorageError::Backend {
            reason: e.to_string(),
        })
    }
}

/// LMDB-backed byte store.
///
/// # Example
///
/// ```ignore
/// use riftstore_storage::{ByteStore, LmdbByteStore};
///
/// let store = LmdbByteStore::open("/tmp/riftstore", 64)?;
/// store.put("MatchDto.EUROPE.EUW1_1", b"...")?;
/// let keys = store.keys_with_prefix("MatchDto.")?;
/// ```
pub struct LmdbByteStore {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
    /// Directory holding the environment.
    path: PathBuf,
}

impl LmdbByteStore {
    /// Open (creating if needed) an LMDB store in `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `max_size_mb` megabytes overflow `usize`
    /// - The directory cannot be created
    /// - LMDB environment cannot be opened
    /// - Database cannot be created
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        let path = path.as_ref().to_path_buf();
        let map_size = max_size_mb
            .checked_mul(1024 * 1024)
            .ok_or(LmdbStoreError::MapSize { max_size_mb })?;
        std::fs::create_dir_all(&path)?;

        // SAFETY: the environment is opened once per store and never mapped
        // by this process through another handle.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(&path)
        }
        .map_err(|e| LmdbStoreError::EnvOpen {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        tracing::debug!(path = %path.display(), max_size_mb, "opened LMDB byte store");

        Ok(Self { env, db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of keys in the store.
    pub fn len(&self) -> Result<u64, LmdbStoreError> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
        self.db
            .len(&rtxn)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, LmdbStoreError> {
        Ok(self.len()? == 0)
    }

    /// Collect keys matching a prefix within `txn`.
    fn collect_keys_with_prefix(
        &self,
        txn: &RoTxn<'_>,
        prefix: &[u8],
    ) -> Result<Vec<String>, LmdbStoreError> {
        let iter = self
            .db
            .prefix_iter(txn, prefix)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let mut keys = Vec::new();
        for result in iter {
            let (key, _) = result.map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
            let key = std::str::from_utf8(key).map_err(|_| LmdbStoreError::InvalidKey)?;
            keys.push(key.to_string());
        }

        Ok(keys)
    }
}

impl ByteStore for LmdbByteStore {
    fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let value = self
            .db
            .get(&rtxn, key.as_bytes())
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(value.map(|bytes| bytes.to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> CacheResult<()> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        self.db
            .put(&mut wtxn, key.as_bytes(), value)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let deleted = self
            .db
            .delete(&mut wtxn, key.as_bytes())
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(deleted)
    }

    fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(self.collect_keys_with_prefix(&rtxn, prefix.as_bytes())?)
    }

    fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let mut deleted = 0u64;
        for key in keys {
            if self
                .db
                .delete(&mut wtxn, key.as_bytes())
                .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?
            {
                deleted += 1;
            }
        }

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(deleted)
    }

    fn delete_prefix(&self, prefix: &str) -> CacheResult<u64> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let keys = self.collect_keys_with_prefix(&wtxn, prefix.as_bytes())?;
        for key in &keys {
            self.db
                .delete(&mut wtxn, key.as_bytes())
                .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
        }

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(keys.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_store() -> (LmdbByteStore, TempDir) {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let store = LmdbByteStore::open(temp_dir.path(), 10).expect("store creation should succeed");
        (store, temp_dir)
    }

    #[test]
    fn test_open_creates_directory() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let nested = temp_dir.path().join("a").join("b");
        let store = LmdbByteStore::open(&nested, 10).expect("store creation should succeed");
        assert!(nested.is_dir());
        assert_eq!(store.path(), nested.as_path());
        assert!(store.is_empty().expect("len should succeed"));
    }

    #[test]
    fn test_put_and_get() {
        let (store, _temp_dir) = create_test_store();

        store.put("AccountDto.AMERICAS.x", b"payload").expect("put should succeed");
        let value = store.get("AccountDto.AMERICAS.x").expect("get should succeed");
        assert_eq!(value, Some(b"payload".to_vec()));
    }

    #[test]
    fn test_get_nonexistent() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.get("missing").expect("get should succeed").is_none());
    }

    #[test]
    fn test_delete() {
        let (store, _temp_dir) = create_test_store();

        store.put("k", b"v").expect("put should succeed");
        assert!(store.delete("k").expect("delete should succeed"));
        assert!(store.get("k").expect("get should succeed").is_none());
        assert!(!store.delete("k").expect("delete should succeed"));
    }

    #[test]
    fn test_overwrite() {
        let (store, _temp_dir) = create_test_store();

        store.put("k", b"first").expect("put should succeed");
        store.put("k", b"second").expect("put should succeed");

        assert_eq!(store.get("k").expect("get should succeed"), Some(b"second".to_vec()));
        assert_eq!(store.len().expect("len should succeed"), 1);
    }

    #[test]
    fn test_keys_with_prefix() {
        let (store, _temp_dir) = create_test_store();

        for key in [
            "SummonerDto.NA1.a",
            "SummonerDto.NA1.b",
            "SummonerDto.KR.c",
            "MatchDto.AMERICAS.d",
        ] {
            store.put(key, b"x").expect("put should succeed");
        }

        let na = store
            .keys_with_prefix("SummonerDto.NA1.")
            .expect("scan should succeed");
        assert_eq!(na, vec!["SummonerDto.NA1.a", "SummonerDto.NA1.b"]);

        let summoners = store.keys_with_prefix("SummonerDto.").expect("scan should succeed");
        assert_eq!(summoners.len(), 3);
    }

    #[test]
    fn test_open_rejects_overflowing_map_size() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let result = LmdbByteStore::open(temp_dir.path(), usize::MAX);
        assert!(matches!(
            result,
            Err(LmdbStoreError::MapSize { max_size_mb: usize::MAX })
        ));
    }

    #[test]
    fn test_batch_deletes() {
        let (store, _temp_dir) = create_test_store();

        for key in [
            "SummonerDto.NA1.a",
            "SummonerDto.NA1.b",
            "SummonerDto.KR.c",
            "SummonerDtoX.d",
            "MatchDto.AMERICAS.d",
        ] {
            store.put(key, b"x").expect("put should succeed");
        }

        let removed = store
            .delete_prefix("SummonerDto.")
            .expect("delete_prefix should succeed");
        assert_eq!(removed, 3);
        assert!(store.get("SummonerDtoX.d").expect("get should succeed").is_some());

        let keys = vec!["MatchDto.AMERICAS.d".to_string(), "MatchDto.AMERICAS.zz".to_string()];
        assert_eq!(store.delete_many(&keys).expect("delete_many should succeed"), 1);
        assert_eq!(store.len().expect("len should succeed"), 1);
    }

    #[test]
    fn test_reopen_persists() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        {
            let store = LmdbByteStore::open(temp_dir.path(), 10).expect("open should succeed");
            store.put("k", b"durable").expect("put should succeed");
        }
        let store = LmdbByteStore::open(temp_dir.path(), 10).expect("reopen should succeed");
        assert_eq!(store.get("k").expect("get should succeed"), Some(b"durable".to_vec()));
    }

    #[test]
    fn test_concurrent_puts_leave_one_intact_value() {
        let (store, _temp_dir) = create_test_store();
        let store = Arc::new(store);

        let writers: Vec<_> = (0..2u8)
            .map(|writer| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let value = vec![writer; 4096];
                    for _ in 0..50 {
                        store.put("shared", &value).expect("put should succeed");
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().expect("writer thread should not panic");
        }

        let value = store
            .get("shared")
            .expect("get should succeed")
            .expect("value should exist");
        assert_eq!(value.len(), 4096);
        assert!(value.iter().all(|b| *b == value[0]));
        assert!(value[0] == 0 || value[0] == 1);
    }
}
