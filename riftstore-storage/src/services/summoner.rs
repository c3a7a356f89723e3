//! Summoner service.
//!
//! Keyed by platform, puuid and summoner id. A query carrying both ids is an
//! exact lookup; a query with only one scans the platform.

use std::sync::Arc;

use riftstore_core::{
    convert_region_to_platform, fields, CacheResult, FieldKind, Query, QueryContract, Record,
    RecordType,
};

use super::{required, unexpected};
use crate::cache::key::escape_fragment;
use crate::cache::{CacheKey, ExpiryPolicy, KvDiskService, Scan, TypeHandler};
use crate::ByteStore;

pub const NAME: &str = "summoner";

fn item_key(item: &Record) -> CacheResult<CacheKey> {
    let Record::Summoner(summoner) = item else {
        return Err(unexpected(RecordType::Summoner, item));
    };
    Ok(CacheKey::builder(RecordType::Summoner)
        .partition(summoner.platform)
        .fragment(required(RecordType::Summoner, "puuid", &summoner.puuid)?)
        .fragment(required(RecordType::Summoner, "id", &summoner.id)?)
        .build())
}

fn exact(query: &Query) -> CacheResult<Option<CacheKey>> {
    let (Some(puuid), Some(id)) = (query.get_str(fields::PUUID), query.get_str(fields::ID)) else {
        return Ok(None);
    };
    Ok(Some(
        CacheKey::builder(RecordType::Summoner)
            .partition(query.platform()?)
            .fragment(puuid)
            .fragment(id)
            .build(),
    ))
}

fn prefix(query: &Query) -> CacheResult<String> {
    Ok(CacheKey::builder(RecordType::Summoner)
        .partition(query.platform()?)
        .prefix())
}

fn candidate(key: &CacheKey, query: &Query) -> bool {
    let segments = key.segments();
    let [_, puuid, id] = segments.as_slice() else {
        return false;
    };
    query
        .get_str(fields::PUUID)
        .map_or(false, |wanted| *puuid == escape_fragment(wanted))
        || query
            .get_str(fields::ID)
            .map_or(false, |wanted| *id == escape_fragment(wanted))
}

fn matches(record: &Record, query: &Query) -> bool {
    let Record::Summoner(summoner) = record else {
        return false;
    };
    query.get_str(fields::PUUID) == Some(summoner.puuid.as_str())
        || query.get_str(fields::ID) == Some(summoner.id.as_str())
}

pub fn handlers() -> Vec<TypeHandler> {
    let contract = QueryContract::has(fields::PUUID, FieldKind::Str)
        .or(fields::ID, FieldKind::Str)
        .also(fields::REGION, FieldKind::Region);

    vec![TypeHandler::new(RecordType::Summoner, contract, item_key)
        .with_transform(convert_region_to_platform)
        .with_exact(exact)
        .with_scan(Scan {
            prefix,
            candidate,
            matches,
        })]
}

pub fn service(store: Arc<dyn ByteStore>, policy: Arc<ExpiryPolicy>) -> KvDiskService {
    KvDiskService::new(NAME, store, policy, handlers())
}
