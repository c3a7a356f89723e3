//! Composite cache: routes typed requests to the services registered for the
//! record type.
//!
//! Reads try each registered source in order and fall through on
//! `NotFound`. Writes fan out to every registered sink. Maintenance
//! operations run once per distinct service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use riftstore_core::{
    CacheConfig, CacheError, CacheResult, ConfigError, Query, Record, RecordType,
};

use super::expiry::ExpiryPolicy;
use super::lmdb_backend::LmdbByteStore;
use super::traits::{CacheStats, DataSink, DataSource, DiskService, RecordIter};
use crate::services;
use crate::ByteStore;

/// Registry of disk services keyed by record type.
pub struct CompositeCache {
    services: Vec<Arc<dyn DiskService>>,
    sources: HashMap<RecordType, Vec<Arc<dyn DiskService>>>,
    sinks: HashMap<RecordType, Vec<Arc<dyn DiskService>>>,
}

impl CompositeCache {
    /// Register `services`. The same service passed twice is kept once.
    pub fn new(services: Vec<Arc<dyn DiskService>>) -> Self {
        let mut distinct: Vec<Arc<dyn DiskService>> = Vec::with_capacity(services.len());
        for service in services {
            if !distinct.iter().any(|known| Arc::ptr_eq(known, &service)) {
                distinct.push(service);
            }
        }

        let mut sources: HashMap<RecordType, Vec<Arc<dyn DiskService>>> = HashMap::new();
        let mut sinks: HashMap<RecordType, Vec<Arc<dyn DiskService>>> = HashMap::new();
        for service in &distinct {
            for rt in service.provides() {
                sources.entry(rt).or_default().push(Arc::clone(service));
            }
            for rt in service.accepts() {
                sinks.entry(rt).or_default().push(Arc::clone(service));
            }
        }

        Self {
            services: distinct,
            sources,
            sinks,
        }
    }

    /// The default services over `store`, plus each named plugin.
    pub fn with_store(
        store: Arc<dyn ByteStore>,
        policy: Arc<ExpiryPolicy>,
        plugins: &[String],
    ) -> CacheResult<Self> {
        let mut built: Vec<Arc<dyn DiskService>> =
            services::default_services(Arc::clone(&store), Arc::clone(&policy))
                .into_iter()
                .map(|service| Arc::new(service) as Arc<dyn DiskService>)
                .collect();

        for name in plugins {
            let factory = services::plugin(name).ok_or_else(|| ConfigError::InvalidValue {
                field: "plugins".to_string(),
                reason: format!("unknown plugin {:?}", name),
            })?;
            tracing::info!(plugin = %name, "enabling plugin service");
            built.push(Arc::new(factory(Arc::clone(&store), Arc::clone(&policy))));
        }

        Ok(Self::new(built))
    }

    /// Open the LMDB store named by `config` and build the default services.
    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        let policy = ExpiryPolicy::from_config(config)?;
        let store = LmdbByteStore::open(&config.path, config.map_size_mb)?;
        tracing::info!(path = %config.path.display(), "opened disk cache");
        Self::with_store(Arc::new(store), Arc::new(policy), &config.plugins)
    }

    pub fn services(&self) -> &[Arc<dyn DiskService>] {
        &self.services
    }

    /// Delete-by-value is not supported; use `clear` or `expire`.
    pub fn delete(&self, _item: &Record) -> CacheResult<()> {
        Err(CacheError::NotImplemented { operation: "delete" })
    }

    fn sinks_for(&self, record_type: RecordType) -> CacheResult<&[Arc<dyn DiskService>]> {
        match self.sinks.get(&record_type) {
            Some(sinks) if !sinks.is_empty() => Ok(sinks.as_slice()),
            _ => Err(CacheError::UnsupportedType { record_type }),
        }
    }

    /// Distinct services that own `record_type`, or all of them.
    fn maintained(&self, record_type: Option<RecordType>) -> Vec<&Arc<dyn DiskService>> {
        match record_type {
            Some(rt) => {
                let mut owners: Vec<&Arc<dyn DiskService>> = Vec::new();
                let registered = self.sources.get(&rt).into_iter().chain(self.sinks.get(&rt));
                for service in registered.flatten() {
                    if !owners.iter().any(|known| Arc::ptr_eq(*known, service)) {
                        owners.push(service);
                    }
                }
                owners
            }
            None => self.services.iter().collect(),
        }
    }
}

impl DataSource for CompositeCache {
    fn provides(&self) -> Vec<RecordType> {
        let mut types: Vec<RecordType> = self.sources.keys().copied().collect();
        types.sort();
        types
    }

    fn get(&self, record_type: RecordType, query: &Query) -> CacheResult<Record> {
        for source in self.sources.get(&record_type).into_iter().flatten() {
            match source.get(record_type, query) {
                Err(e) if e.is_not_found() => continue,
                result => return result,
            }
        }
        Err(CacheError::NotFound { record_type })
    }

    fn get_many<'a>(
        &'a self,
        record_type: RecordType,
        query: &Query,
    ) -> CacheResult<RecordIter<'a>> {
        for source in self.sources.get(&record_type).into_iter().flatten() {
            match source.get_many(record_type, query) {
                Err(e) if e.is_not_found() => continue,
                result => return result,
            }
        }
        Err(CacheError::NotFound { record_type })
    }
}

impl DataSink for CompositeCache {
    fn accepts(&self) -> Vec<RecordType> {
        let mut types: Vec<RecordType> = self.sinks.keys().copied().collect();
        types.sort();
        types
    }

    fn put(&self, item: &Record) -> CacheResult<()> {
        for sink in self.sinks_for(item.record_type())? {
            sink.put(item)?;
        }
        Ok(())
    }

    fn put_many(&self, items: &[Record]) -> CacheResult<()> {
        for item in items {
            self.put(item)?;
        }
        Ok(())
    }
}

impl DiskService for CompositeCache {
    fn name(&self) -> &str {
        "composite"
    }

    fn put_at(&self, item: &Record, written_at: DateTime<Utc>) -> CacheResult<()> {
        for sink in self.sinks_for(item.record_type())? {
            sink.put_at(item, written_at)?;
        }
        Ok(())
    }

    fn clear(&self, record_type: Option<RecordType>) -> CacheResult<u64> {
        let mut removed = 0;
        for service in self.maintained(record_type) {
            removed += service.clear(record_type)?;
        }
        Ok(removed)
    }

    fn expire(&self, record_type: Option<RecordType>) -> CacheResult<u64> {
        let mut removed = 0;
        for service in self.maintained(record_type) {
            removed += service.expire(record_type)?;
        }
        Ok(removed)
    }

    fn stats(&self) -> CacheStats {
        let mut total = CacheStats::default();
        for service in &self.services {
            total.absorb(&service.stats());
        }
        total
    }
}
