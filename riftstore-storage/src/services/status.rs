//! Shard status, one entry per platform.

use std::sync::Arc;

use riftstore_core::{
    convert_region_to_platform, fields, CacheResult, FieldKind, Platform, Query, QueryContract,
    Record, RecordType,
};

use super::unexpected;
use crate::cache::{CacheKey, ExpiryPolicy, KvDiskService, TypeHandler};
use crate::ByteStore;

pub const NAME: &str = "status";

fn key(platform: Platform) -> CacheKey {
    CacheKey::builder(RecordType::ShardStatus)
        .partition(platform)
        .build()
}

fn item_key(item: &Record) -> CacheResult<CacheKey> {
    match item {
        Record::ShardStatus(status) => Ok(key(status.platform)),
        other => Err(unexpected(RecordType::ShardStatus, other)),
    }
}

fn exact(query: &Query) -> CacheResult<Option<CacheKey>> {
    Ok(Some(key(query.platform()?)))
}

pub fn handlers() -> Vec<TypeHandler> {
    vec![TypeHandler::new(
        RecordType::ShardStatus,
        QueryContract::has(fields::REGION, FieldKind::Region),
        item_key,
    )
    .with_transform(convert_region_to_platform)
    .with_exact(exact)]
}

pub fn service(store: Arc<dyn ByteStore>, policy: Arc<ExpiryPolicy>) -> KvDiskService {
    KvDiskService::new(NAME, store, policy, handlers())
}
