//! Disk cache layer.
//!
//! Records are written under canonical keys (see [`key`]) into a
//! [`ByteStore`](crate::ByteStore), prefixed with their write time. Reads
//! validate the query, find candidate keys and drop anything the
//! [`ExpiryPolicy`] deems stale.
//!
//! # Example
//!
//! ```ignore
//! let cache = CompositeCache::from_config(&CacheConfig::from_path(path)?)?;
//! cache.put(&Record::Account(account))?;
//!
//! let query = Query::new()
//!     .with("gameName", "Foo Bar")
//!     .with("tagLine", "NA1")
//!     .with("region", "NA");
//! let account = cache.get(RecordType::Account, &query)?;
//! ```

pub mod composite;
pub mod entry;
pub mod expiry;
pub mod key;
pub mod lmdb_backend;
pub mod service;
pub mod traits;

pub use composite::CompositeCache;
pub use entry::StoredEntry;
pub use expiry::ExpiryPolicy;
pub use key::{CacheKey, CacheKeyBuilder};
pub use lmdb_backend::{LmdbByteStore, LmdbStoreError};
pub use service::{KvDiskService, Scan, TypeHandler};
pub use traits::{CacheStats, DataSink, DataSource, DiskService, RecordIter};
