//! Pipeline-facing traits and cache statistics.
//!
//! Services and the composite cache both present themselves to a data
//! pipeline as a [`DataSource`] (reads) and a [`DataSink`] (writes).
//! [`DiskService`] adds the maintenance operations a disk cache owns.

use chrono::{DateTime, Utc};
use riftstore_core::{CacheResult, Query, Record, RecordType};

/// Lazy, finite, single-pass sequence of records produced by `get_many`.
pub type RecordIter<'a> = Box<dyn Iterator<Item = CacheResult<Record>> + 'a>;

/// A pipeline stage that can answer queries for some record types.
pub trait DataSource: Send + Sync {
    /// Record types this source can answer for.
    fn provides(&self) -> Vec<RecordType>;

    /// Return the single record matching `query`, or `NotFound`.
    fn get(&self, record_type: RecordType, query: &Query) -> CacheResult<Record>;

    /// Return every record matching `query`. An empty result is not an error.
    fn get_many<'a>(&'a self, record_type: RecordType, query: &Query)
        -> CacheResult<RecordIter<'a>>;
}

/// A pipeline stage that accepts records for some record types.
pub trait DataSink: Send + Sync {
    /// Record types this sink accepts.
    fn accepts(&self) -> Vec<RecordType>;

    fn put(&self, item: &Record) -> CacheResult<()>;

    /// Put each item in order. Not atomic: the first failure is returned and
    /// earlier writes stay committed.
    fn put_many(&self, items: &[Record]) -> CacheResult<()> {
        for item in items {
            self.put(item)?;
        }
        Ok(())
    }
}

/// A disk-backed cache service: source, sink and maintenance.
pub trait DiskService: DataSource + DataSink {
    /// Short service name used in logs.
    fn name(&self) -> &str;

    /// Write `item` stamped with an explicit write time.
    fn put_at(&self, item: &Record, written_at: DateTime<Utc>) -> CacheResult<()>;

    /// Delete every entry of `record_type`, or of every owned type when
    /// `None`. Returns the number of entries removed.
    fn clear(&self, record_type: Option<RecordType>) -> CacheResult<u64>;

    /// Delete stale entries of `record_type`, or of every owned type when
    /// `None`. Returns the number of entries removed.
    fn expire(&self, record_type: Option<RecordType>) -> CacheResult<u64>;

    /// Statistics summed over every owned type.
    fn stats(&self) -> CacheStats;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered with a fresh entry.
    pub hits: u64,
    /// Reads that found nothing fresh.
    pub misses: u64,
    /// Entries skipped on read because they were stale.
    pub stale_reads: u64,
    /// Entries written.
    pub writes: u64,
    /// Entries removed by clear or expire.
    pub removed: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Add `other`'s counters into `self`.
    pub fn absorb(&mut self, other: &CacheStats) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.stale_reads += other.stale_reads;
        self.writes += other.writes;
        self.removed += other.removed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_cache_stats_absorb() {
        let mut total = CacheStats {
            hits: 1,
            writes: 2,
            ..Default::default()
        };
        total.absorb(&CacheStats {
            hits: 3,
            misses: 4,
            stale_reads: 5,
            writes: 6,
            removed: 7,
        });
        assert_eq!(
            total,
            CacheStats {
                hits: 4,
                misses: 4,
                stale_reads: 5,
                writes: 8,
                removed: 7,
            }
        );
    }
}
