//! ChampionGG statistics plugin.
//!
//! Only registered when `"ChampionGG"` is listed in the configured plugins.
//! Entries are keyed by patch, elo and champion; they are not region
//! partitioned.

use std::sync::Arc;

use riftstore_core::{fields, CacheResult, FieldKind, Query, QueryContract, Record, RecordType};

use super::{required, unexpected};
use crate::cache::{CacheKey, CacheKeyBuilder, ExpiryPolicy, KvDiskService, Scan, TypeHandler};
use crate::ByteStore;

pub const NAME: &str = "championgg";

fn bucket(patch: &str, elo: &str) -> CacheResult<CacheKeyBuilder> {
    Ok(CacheKey::builder(RecordType::ChampionGg)
        .fragment(required(RecordType::ChampionGg, "patch", patch)?)
        .fragment(required(RecordType::ChampionGg, "elo", elo)?))
}

fn item_key(item: &Record) -> CacheResult<CacheKey> {
    let Record::ChampionGg(stats) = item else {
        return Err(unexpected(RecordType::ChampionGg, item));
    };
    Ok(bucket(&stats.patch, &stats.elo)?
        .fragment(&stats.champion_id.to_string())
        .build())
}

fn query_bucket(query: &Query) -> CacheResult<CacheKeyBuilder> {
    bucket(query.str_field(fields::PATCH)?, query.str_field(fields::ELO)?)
}

fn exact(query: &Query) -> CacheResult<Option<CacheKey>> {
    match query.get_i64(fields::ID) {
        Some(id) => Ok(Some(query_bucket(query)?.fragment(&id.to_string()).build())),
        None => Ok(None),
    }
}

fn prefix(query: &Query) -> CacheResult<String> {
    Ok(query_bucket(query)?.prefix())
}

pub fn handlers() -> Vec<TypeHandler> {
    let get_contract = QueryContract::has(fields::ID, FieldKind::Int)
        .also(fields::PATCH, FieldKind::Str)
        .also(fields::ELO, FieldKind::Str);
    let many_contract = QueryContract::has(fields::PATCH, FieldKind::Str)
        .also(fields::ELO, FieldKind::Str)
        .maybe(fields::ID, FieldKind::Int);

    vec![TypeHandler::new(RecordType::ChampionGg, get_contract, item_key)
        .with_many_contract(many_contract)
        .with_exact(exact)
        .with_scan(Scan {
            prefix,
            candidate: |_, _| true,
            matches: |record, _| matches!(record, Record::ChampionGg(_)),
        })]
}

pub fn service(store: Arc<dyn ByteStore>, policy: Arc<ExpiryPolicy>) -> KvDiskService {
    KvDiskService::new(NAME, store, policy, handlers())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DataSink, DataSource};
    use crate::InMemoryByteStore;
    use riftstore_test_utils::assertions::assert_invalid_query;
    use riftstore_test_utils::fixtures;

    fn setup() -> (InMemoryByteStore, KvDiskService) {
        let store = InMemoryByteStore::new();
        let service = service(Arc::new(store.clone()), Arc::new(ExpiryPolicy::never()));
        service
            .put_many(&[
                fixtures::championgg(103, "14.2", "PLATINUM").into(),
                fixtures::championgg(238, "14.2", "PLATINUM").into(),
                fixtures::championgg(103, "14.2", "GOLD").into(),
            ])
            .expect("put_many");
        (store, service)
    }

    #[test]
    fn test_key_layout() {
        let (store, _service) = setup();
        assert!(store.contains_key("ChampionGgDto.14%2E2.PLATINUM.103").expect("lock"));
    }

    #[test]
    fn test_get_needs_champion() {
        let (_store, service) = setup();
        let query = Query::new()
            .with(fields::ID, 238)
            .with(fields::PATCH, "14.2")
            .with(fields::ELO, "PLATINUM");
        assert_eq!(
            service.get(RecordType::ChampionGg, &query).expect("hit"),
            Record::ChampionGg(fixtures::championgg(238, "14.2", "PLATINUM"))
        );

        let without_id = Query::new().with(fields::PATCH, "14.2").with(fields::ELO, "PLATINUM");
        assert_invalid_query(&service.get(RecordType::ChampionGg, &without_id));
    }

    #[test]
    fn test_get_many_scans_bucket() {
        let (_store, service) = setup();
        let query = Query::new().with(fields::PATCH, "14.2").with(fields::ELO, "PLATINUM");
        let found = service
            .get_many(RecordType::ChampionGg, &query)
            .expect("get_many")
            .collect::<CacheResult<Vec<_>>>()
            .expect("decode");
        assert_eq!(found.len(), 2);
    }
}
