//! Free champion rotation, one entry per platform.

use std::sync::Arc;

use riftstore_core::{
    convert_region_to_platform, fields, CacheResult, FieldKind, Platform, Query, QueryContract,
    Record, RecordType,
};

use super::unexpected;
use crate::cache::{CacheKey, ExpiryPolicy, KvDiskService, TypeHandler};
use crate::ByteStore;

pub const NAME: &str = "champion";

fn key(platform: Platform) -> CacheKey {
    CacheKey::builder(RecordType::ChampionRotation)
        .partition(platform)
        .build()
}

fn item_key(item: &Record) -> CacheResult<CacheKey> {
    match item {
        Record::ChampionRotation(rotation) => Ok(key(rotation.platform)),
        other => Err(unexpected(RecordType::ChampionRotation, other)),
    }
}

fn exact(query: &Query) -> CacheResult<Option<CacheKey>> {
    Ok(Some(key(query.platform()?)))
}

pub fn handlers() -> Vec<TypeHandler> {
    vec![TypeHandler::new(
        RecordType::ChampionRotation,
        QueryContract::has(fields::REGION, FieldKind::Region),
        item_key,
    )
    .with_transform(convert_region_to_platform)
    .with_exact(exact)]
}

pub fn service(store: Arc<dyn ByteStore>, policy: Arc<ExpiryPolicy>) -> KvDiskService {
    KvDiskService::new(NAME, store, policy, handlers())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DataSink, DataSource};
    use crate::InMemoryByteStore;
    use riftstore_test_utils::fixtures;

    #[test]
    fn test_rotation_per_platform() {
        let store = InMemoryByteStore::new();
        let service = service(Arc::new(store.clone()), Arc::new(ExpiryPolicy::never()));
        let rotation = fixtures::champion_rotation(Platform::Oc1);
        service.put(&rotation.clone().into()).expect("put");

        assert!(store.contains_key("ChampionRotationDto.OC1").expect("lock"));
        let query = Query::new().with(fields::REGION, "OCE");
        assert_eq!(
            service.get(RecordType::ChampionRotation, &query).expect("hit"),
            Record::ChampionRotation(rotation)
        );
    }

    #[test]
    fn test_later_put_overwrites() {
        let store = InMemoryByteStore::new();
        let service = service(Arc::new(store.clone()), Arc::new(ExpiryPolicy::never()));
        let mut rotation = fixtures::champion_rotation(Platform::Kr);
        service.put(&rotation.clone().into()).expect("put");
        rotation.free_champion_ids = vec![7];
        service.put(&rotation.clone().into()).expect("put");

        let query = Query::new().with(fields::REGION, "KR");
        assert_eq!(
            service.get(RecordType::ChampionRotation, &query).expect("hit"),
            Record::ChampionRotation(rotation)
        );
        assert_eq!(store.len().expect("lock"), 1);
    }
}
