//! Per-type disk services.
//!
//! Each module declares the [`TypeHandler`]s for one record family and a
//! `service` constructor. [`default_services`] builds the always-on set;
//! optional services are looked up by name in [`PLUGINS`].

pub mod account;
pub mod champion;
pub mod championgg;
pub mod championmastery;
pub mod leagues;
pub mod matches;
pub mod patch;
pub mod spectator;
pub mod staticdata;
pub mod status;
pub mod summoner;

use std::sync::Arc;

use riftstore_core::{CacheError, CacheResult, Record, RecordType};

use crate::cache::{ExpiryPolicy, KvDiskService};
use crate::ByteStore;

/// Builds a service over a shared store and policy.
pub type ServiceFactory = fn(Arc<dyn ByteStore>, Arc<ExpiryPolicy>) -> KvDiskService;

/// Optional services, keyed by the name used in `CacheConfig::plugins`.
pub const PLUGINS: &[(&str, ServiceFactory)] = &[("ChampionGG", championgg::service)];

/// Look up an optional service by name.
pub fn plugin(name: &str) -> Option<ServiceFactory> {
    PLUGINS
        .iter()
        .find(|(plugin, _)| *plugin == name)
        .map(|(_, factory)| *factory)
}

/// The services that are always registered.
pub fn default_services(store: Arc<dyn ByteStore>, policy: Arc<ExpiryPolicy>) -> Vec<KvDiskService> {
    let factories: [ServiceFactory; 10] = [
        staticdata::service,
        champion::service,
        summoner::service,
        account::service,
        championmastery::service,
        matches::service,
        spectator::service,
        status::service,
        leagues::service,
        patch::service,
    ];
    factories
        .into_iter()
        .map(|factory| factory(Arc::clone(&store), Arc::clone(&policy)))
        .collect()
}

/// Reject identity fields that would produce an empty key segment.
pub(crate) fn required<'a>(
    record_type: RecordType,
    field: &str,
    value: &'a str,
) -> CacheResult<&'a str> {
    if value.is_empty() {
        return Err(CacheError::InvalidRecord {
            record_type,
            reason: format!("{} is empty", field),
        });
    }
    Ok(value)
}

/// A handler received a record of a type it does not key.
pub(crate) fn unexpected(expected: RecordType, found: &Record) -> CacheError {
    CacheError::InvalidRecord {
        record_type: expected,
        reason: format!("cannot key a {} record", found.record_type()),
    }
}
