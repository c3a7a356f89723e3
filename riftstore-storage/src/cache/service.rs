//! Generic per-type disk service.
//!
//! A [`KvDiskService`] owns a byte store, an expiry policy and a fixed table
//! of [`TypeHandler`]s. Each handler tells the service how to derive a key
//! from a record, which query fields it needs, and how to find records for a
//! query: an exact key, a prefix scan with a match predicate, or both.
//!
//! Scans are linear in the number of entries of the type. Only types that
//! accept several identities (account, summoner, spectator, ...) scan.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use riftstore_core::{
    CacheError, CacheResult, Query, QueryContract, QueryTransform, Record, RecordType,
};

use super::entry::StoredEntry;
use super::expiry::ExpiryPolicy;
use super::key::CacheKey;
use super::traits::{CacheStats, DataSink, DataSource, DiskService, RecordIter};
use crate::ByteStore;

/// Derives the storage key of a record.
pub type ItemKeyFn = fn(&Record) -> CacheResult<CacheKey>;

/// Derives a single key from a prepared query, or `None` when the query does
/// not pin one down.
pub type ExactKeyFn = fn(&Query) -> CacheResult<Option<CacheKey>>;

/// Prefix scan over a type's namespace.
#[derive(Debug, Clone, Copy)]
pub struct Scan {
    /// Key prefix to enumerate for a prepared query.
    pub prefix: fn(&Query) -> CacheResult<String>,
    /// Cheap key-level filter applied before an entry is loaded.
    pub candidate: fn(&CacheKey, &Query) -> bool,
    /// Record-level predicate. Must re-check anything the key truncates.
    pub matches: fn(&Record, &Query) -> bool,
}

/// Lookup rules for one record type.
#[derive(Debug, Clone)]
pub struct TypeHandler {
    record_type: RecordType,
    contract: QueryContract,
    many_contract: Option<QueryContract>,
    transforms: Vec<QueryTransform>,
    item_key: ItemKeyFn,
    exact: Option<ExactKeyFn>,
    scan: Option<Scan>,
}

impl TypeHandler {
    pub fn new(record_type: RecordType, contract: QueryContract, item_key: ItemKeyFn) -> Self {
        Self {
            record_type,
            contract,
            many_contract: None,
            transforms: Vec::new(),
            item_key,
            exact: None,
            scan: None,
        }
    }

    /// Run `transform` on every query after validation.
    pub fn with_transform(mut self, transform: QueryTransform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn with_exact(mut self, exact: ExactKeyFn) -> Self {
        self.exact = Some(exact);
        self
    }

    pub fn with_scan(mut self, scan: Scan) -> Self {
        self.scan = Some(scan);
        self
    }

    /// Looser contract for `get_many`. Defaults to the `get` contract.
    pub fn with_many_contract(mut self, contract: QueryContract) -> Self {
        self.many_contract = Some(contract);
        self
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn item_key(&self, item: &Record) -> CacheResult<CacheKey> {
        (self.item_key)(item)
    }

    /// Validate against `contract`, then apply the transforms to a copy.
    fn prepare(&self, contract: &QueryContract, query: &Query) -> CacheResult<Query> {
        contract.validate(self.record_type, query)?;
        let mut prepared = query.clone();
        for transform in &self.transforms {
            transform(&mut prepared)?;
        }
        Ok(prepared)
    }
}

/// Disk service backed by a [`ByteStore`].
pub struct KvDiskService {
    name: &'static str,
    store: Arc<dyn ByteStore>,
    policy: Arc<ExpiryPolicy>,
    handlers: HashMap<RecordType, TypeHandler>,
    stats: RwLock<HashMap<RecordType, CacheStats>>,
}

impl KvDiskService {
    pub fn new(
        name: &'static str,
        store: Arc<dyn ByteStore>,
        policy: Arc<ExpiryPolicy>,
        handlers: Vec<TypeHandler>,
    ) -> Self {
        let handlers = handlers
            .into_iter()
            .map(|handler| (handler.record_type, handler))
            .collect();
        Self {
            name,
            store,
            policy,
            handlers,
            stats: RwLock::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &ExpiryPolicy {
        &self.policy
    }

    /// Owned types in a stable order.
    pub fn record_types(&self) -> Vec<RecordType> {
        self.handlers
            .keys()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn handler(&self, record_type: RecordType) -> Option<&TypeHandler> {
        self.handlers.get(&record_type)
    }

    /// Statistics for one owned type.
    pub fn stats_for(&self, record_type: RecordType) -> CacheStats {
        self.stats
            .read()
            .ok()
            .and_then(|stats| stats.get(&record_type).cloned())
            .unwrap_or_default()
    }

    fn bump(&self, record_type: RecordType, update: impl FnOnce(&mut CacheStats)) {
        if let Ok(mut stats) = self.stats.write() {
            update(stats.entry(record_type).or_default());
        }
    }

    fn read_handler(&self, record_type: RecordType) -> CacheResult<&TypeHandler> {
        self.handlers
            .get(&record_type)
            .ok_or(CacheError::NotFound { record_type })
    }

    fn write_handler(&self, record_type: RecordType) -> CacheResult<&TypeHandler> {
        self.handlers
            .get(&record_type)
            .ok_or(CacheError::UnsupportedType { record_type })
    }

    /// Build the lazy match sequence for a prepared query.
    fn lookup(&self, handler: &TypeHandler, query: Query) -> CacheResult<Matches<'_>> {
        let record_type = handler.record_type;

        let exact_key = match handler.exact {
            Some(exact) => exact(&query)?,
            None => None,
        };

        let (keys, scan) = match (exact_key, handler.scan) {
            (Some(key), _) => (vec![key.into_string()], None),
            (None, Some(scan)) => {
                let prefix = (scan.prefix)(&query)?;
                (self.store.keys_with_prefix(&prefix)?, Some(scan))
            }
            (None, None) => (Vec::new(), None),
        };

        Ok(Matches {
            service: self,
            record_type,
            query,
            scan,
            keys: keys.into_iter(),
            now: Utc::now(),
        })
    }

    /// Load `key` and decode it if present and fresh.
    fn load_fresh(
        &self,
        record_type: RecordType,
        key: &str,
        now: DateTime<Utc>,
    ) -> CacheResult<Option<Record>> {
        let Some(bytes) = self.store.get(key)? else {
            return Ok(None);
        };

        let Some(entry) = StoredEntry::decode(&bytes) else {
            tracing::debug!(record_type = %record_type, key, "skipping entry without header");
            return Ok(None);
        };

        if self.policy.is_stale(record_type, entry.written_at(), now) {
            tracing::debug!(record_type = %record_type, key, "stale entry");
            self.bump(record_type, |s| s.stale_reads += 1);
            return Ok(None);
        }

        Record::from_json(record_type, entry.payload()).map(Some)
    }

    fn owned_types(&self, record_type: Option<RecordType>) -> Vec<RecordType> {
        match record_type {
            Some(rt) if self.handlers.contains_key(&rt) => vec![rt],
            Some(_) => Vec::new(),
            None => self.record_types(),
        }
    }
}

/// Lazy sequence of fresh records matching a query.
struct Matches<'a> {
    service: &'a KvDiskService,
    record_type: RecordType,
    query: Query,
    scan: Option<Scan>,
    keys: std::vec::IntoIter<String>,
    now: DateTime<Utc>,
}

impl Iterator for Matches<'_> {
    type Item = CacheResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        for raw in self.keys.by_ref() {
            if let Some(scan) = &self.scan {
                let is_candidate = CacheKey::parse(&raw)
                    .map(|key| (scan.candidate)(&key, &self.query))
                    .unwrap_or(false);
                if !is_candidate {
                    continue;
                }
            }

            match self.service.load_fresh(self.record_type, &raw, self.now) {
                Ok(Some(record)) => {
                    let matched = self
                        .scan
                        .map(|scan| (scan.matches)(&record, &self.query))
                        .unwrap_or(true);
                    if matched {
                        return Some(Ok(record));
                    }
                }
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

impl DataSource for KvDiskService {
    fn provides(&self) -> Vec<RecordType> {
        self.record_types()
    }

    fn get(&self, record_type: RecordType, query: &Query) -> CacheResult<Record> {
        let handler = self.read_handler(record_type)?;
        let prepared = handler.prepare(&handler.contract, query)?;

        match self.lookup(handler, prepared)?.next() {
            Some(Ok(record)) => {
                tracing::debug!(service = self.name, record_type = %record_type, "cache hit");
                self.bump(record_type, |s| s.hits += 1);
                Ok(record)
            }
            Some(Err(e)) => Err(e),
            None => {
                tracing::debug!(service = self.name, record_type = %record_type, "cache miss");
                self.bump(record_type, |s| s.misses += 1);
                Err(CacheError::NotFound { record_type })
            }
        }
    }

    fn get_many<'a>(
        &'a self,
        record_type: RecordType,
        query: &Query,
    ) -> CacheResult<RecordIter<'a>> {
        let handler = self.read_handler(record_type)?;
        let contract = handler.many_contract.as_ref().unwrap_or(&handler.contract);
        let prepared = handler.prepare(contract, query)?;

        let matches = self.lookup(handler, prepared)?;
        Ok(Box::new(matches.inspect(move |result| {
            if result.is_ok() {
                self.bump(record_type, |s| s.hits += 1);
            }
        })))
    }
}

impl DataSink for KvDiskService {
    fn accepts(&self) -> Vec<RecordType> {
        self.record_types()
    }

    fn put(&self, item: &Record) -> CacheResult<()> {
        self.put_at(item, Utc::now())
    }
}

impl DiskService for KvDiskService {
    fn name(&self) -> &str {
        self.name
    }

    fn put_at(&self, item: &Record, written_at: DateTime<Utc>) -> CacheResult<()> {
        let record_type = item.record_type();
        let handler = self.write_handler(record_type)?;

        if !self.policy.should_store(record_type) {
            tracing::debug!(service = self.name, record_type = %record_type, "caching disabled, skipping put");
            return Ok(());
        }

        let key = handler.item_key(item)?;
        let entry = StoredEntry::new(written_at, item.to_json()?);
        self.store.put(key.as_str(), &entry.encode())?;

        tracing::debug!(service = self.name, record_type = %record_type, key = %key, "stored entry");
        self.bump(record_type, |s| s.writes += 1);
        Ok(())
    }

    fn clear(&self, record_type: Option<RecordType>) -> CacheResult<u64> {
        let mut total = 0;
        for rt in self.owned_types(record_type) {
            let removed = self.store.delete_prefix(&CacheKey::type_prefix(rt))?;
            tracing::info!(service = self.name, record_type = %rt, removed, "cleared entries");
            self.bump(rt, |s| s.removed += removed);
            total += removed;
        }
        Ok(total)
    }

    fn expire(&self, record_type: Option<RecordType>) -> CacheResult<u64> {
        let now = Utc::now();
        let mut total = 0;
        for rt in self.owned_types(record_type) {
            let mut doomed = Vec::new();
            for key in self.store.keys_with_prefix(&CacheKey::type_prefix(rt))? {
                let Some(bytes) = self.store.get(&key)? else {
                    continue;
                };
                let stale = match StoredEntry::written_at_of(&bytes) {
                    Some(written_at) => self.policy.is_stale(rt, written_at, now),
                    None => {
                        tracing::warn!(service = self.name, record_type = %rt, key = %key, "removing undecodable entry");
                        true
                    }
                };
                if stale {
                    doomed.push(key);
                }
            }
            let removed = self.store.delete_many(&doomed)?;
            tracing::info!(service = self.name, record_type = %rt, removed, "expired entries");
            self.bump(rt, |s| s.removed += removed);
            total += removed;
        }
        Ok(total)
    }

    fn stats(&self) -> CacheStats {
        let mut total = CacheStats::default();
        if let Ok(stats) = self.stats.read() {
            for per_type in stats.values() {
                total.absorb(per_type);
            }
        }
        total
    }
}
