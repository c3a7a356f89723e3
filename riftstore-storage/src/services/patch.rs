//! Global patch list. There is exactly one entry and any query finds it.

use std::sync::Arc;

use riftstore_core::{CacheResult, Query, QueryContract, Record, RecordType};

use super::unexpected;
use crate::cache::key::GLOBAL_PARTITION;
use crate::cache::{CacheKey, ExpiryPolicy, KvDiskService, TypeHandler};
use crate::ByteStore;

pub const NAME: &str = "patch";

fn key() -> CacheKey {
    CacheKey::builder(RecordType::PatchList)
        .partition(GLOBAL_PARTITION)
        .build()
}

fn item_key(item: &Record) -> CacheResult<CacheKey> {
    match item {
        Record::PatchList(_) => Ok(key()),
        other => Err(unexpected(RecordType::PatchList, other)),
    }
}

fn exact(_query: &Query) -> CacheResult<Option<CacheKey>> {
    Ok(Some(key()))
}

pub fn handlers() -> Vec<TypeHandler> {
    vec![TypeHandler::new(RecordType::PatchList, QueryContract::any(), item_key).with_exact(exact)]
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
    fn test_any_query_finds_the_patch_list() {
        let store = InMemoryByteStore::new();
        let service = service(Arc::new(store.clone()), Arc::new(ExpiryPolicy::never()));
        let patches = fixtures::patch_list();
        service.put(&patches.clone().into()).expect("put");

        assert!(store.contains_key("PatchListDto.global").expect("lock"));
        for query in [Query::new(), Query::new().with("region", "NA")] {
            assert_eq!(
                service.get(RecordType::PatchList, &query).expect("hit"),
                Record::PatchList(patches.clone())
            );
        }
    }
}
