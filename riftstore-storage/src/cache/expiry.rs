//! Time-based expiration policy.
//!
//! Staleness is a pure function of the entry's write time, the current time
//! and the record type's configured [`Expiration`]. Reads use
//! [`ExpiryPolicy::is_stale`] to treat stale entries as absent; physical
//! removal only happens in an explicit sweep.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use riftstore_core::{CacheConfig, ConfigError, Expiration, RecordType};

/// Per-type TTLs. Types without an entry never expire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpiryPolicy {
    expirations: HashMap<RecordType, Expiration>,
}

impl ExpiryPolicy {
    pub fn new(expirations: HashMap<RecordType, Expiration>) -> Self {
        Self { expirations }
    }

    /// A policy under which nothing expires.
    pub fn never() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.expirations()?))
    }

    pub fn with(mut self, record_type: RecordType, expiration: Expiration) -> Self {
        self.expirations.insert(record_type, expiration);
        self
    }

    pub fn with_ttl(self, record_type: RecordType, ttl: Duration) -> Self {
        self.with(record_type, Expiration::After(ttl))
    }

    pub fn expiration(&self, record_type: RecordType) -> Expiration {
        self.expirations
            .get(&record_type)
            .copied()
            .unwrap_or(Expiration::Never)
    }

    /// `None` means entries live forever. Disabled types report zero.
    pub fn ttl_for(&self, record_type: RecordType) -> Option<Duration> {
        match self.expiration(record_type) {
            Expiration::Never => None,
            Expiration::After(ttl) => Some(ttl),
            Expiration::Disabled => Some(Duration::ZERO),
        }
    }

    /// Whether puts for `record_type` are written at all.
    pub fn should_store(&self, record_type: RecordType) -> bool {
        self.expiration(record_type) != Expiration::Disabled
    }

    /// True once more than the TTL has elapsed since `written_at`.
    ///
    /// Entries stamped in the future (clock skew) count as fresh.
    pub fn is_stale(
        &self,
        record_type: RecordType,
        written_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        match self.expiration(record_type) {
            Expiration::Never => false,
            Expiration::Disabled => true,
            Expiration::After(ttl) => match (now - written_at).to_std() {
                Ok(elapsed) => elapsed > ttl,
                Err(_) => false,
            },
        }
    }
}
