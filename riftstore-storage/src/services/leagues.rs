//! League list service.
//!
//! Keyed by league id. Queries by queue and tier scan the platform.

use std::sync::Arc;

use riftstore_core::{
    convert_region_to_platform, fields, CacheResult, FieldKind, Query, QueryContract, Record,
    RecordType,
};

use super::{required, unexpected};
use crate::cache::{CacheKey, ExpiryPolicy, KvDiskService, Scan, TypeHandler};
use crate::ByteStore;

pub const NAME: &str = "leagues";

fn item_key(item: &Record) -> CacheResult<CacheKey> {
    let Record::LeagueList(league) = item else {
        return Err(unexpected(RecordType::LeagueList, item));
    };
    Ok(CacheKey::builder(RecordType::LeagueList)
        .partition(league.platform)
        .fragment(required(RecordType::LeagueList, "leagueId", &league.league_id)?)
        .build())
}

fn exact(query: &Query) -> CacheResult<Option<CacheKey>> {
    let Some(id) = query.get_str(fields::ID) else {
        return Ok(None);
    };
    Ok(Some(
        CacheKey::builder(RecordType::LeagueList)
            .partition(query.platform()?)
            .fragment(id)
            .build(),
    ))
}

fn prefix(query: &Query) -> CacheResult<String> {
    Ok(CacheKey::builder(RecordType::LeagueList)
        .partition(query.platform()?)
        .prefix())
}

fn matches(record: &Record, query: &Query) -> bool {
    let Record::LeagueList(league) = record else {
        return false;
    };
    query.get_str(fields::QUEUE) == Some(league.queue.as_str())
        && query
            .get_str(fields::TIER)
            .map_or(false, |tier| tier.eq_ignore_ascii_case(&league.tier))
}

pub fn handlers() -> Vec<TypeHandler> {
    let contract = QueryContract::has(fields::ID, FieldKind::Str)
        .or(fields::QUEUE, FieldKind::Str)
        .and(fields::TIER, FieldKind::Str)
        .also(fields::REGION, FieldKind::Region);

    vec![TypeHandler::new(RecordType::LeagueList, contract, item_key)
        .with_transform(convert_region_to_platform)
        .with_exact(exact)
        .with_scan(Scan {
            prefix,
            candidate: |_, _| true,
            matches,
        })]
}

pub fn service(store: Arc<dyn ByteStore>, policy: Arc<ExpiryPolicy>) -> KvDiskService {
    KvDiskService::new(NAME, store, policy, handlers())
}
