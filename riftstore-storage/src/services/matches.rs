//! Match and timeline service.
//!
//! Both types are keyed by continent and match id and only ever looked up
//! exactly.

use std::sync::Arc;

use riftstore_core::{
    convert_to_continent, fields, CacheResult, Continent, FieldKind, Query, QueryContract, Record,
    RecordType,
};

use super::{required, unexpected};
use crate::cache::{CacheKey, ExpiryPolicy, KvDiskService, TypeHandler};
use crate::ByteStore;

pub const NAME: &str = "match";

fn key(record_type: RecordType, continent: Continent, match_id: &str) -> CacheResult<CacheKey> {
    Ok(CacheKey::builder(record_type)
        .partition(continent)
        .fragment(required(record_type, "matchId", match_id)?)
        .build())
}

fn match_key(item: &Record) -> CacheResult<CacheKey> {
    match item {
        Record::Match(m) => key(RecordType::Match, m.region.continent(), &m.match_id),
        other => Err(unexpected(RecordType::Match, other)),
    }
}

fn timeline_key(item: &Record) -> CacheResult<CacheKey> {
    match item {
        Record::Timeline(t) => key(RecordType::Timeline, t.region.continent(), &t.match_id),
        other => Err(unexpected(RecordType::Timeline, other)),
    }
}

fn match_exact(query: &Query) -> CacheResult<Option<CacheKey>> {
    key(RecordType::Match, query.continent()?, query.str_field(fields::ID)?).map(Some)
}

fn timeline_exact(query: &Query) -> CacheResult<Option<CacheKey>> {
    key(RecordType::Timeline, query.continent()?, query.str_field(fields::ID)?).map(Some)
}

fn contract() -> QueryContract {
    QueryContract::has(fields::ID, FieldKind::Str).also(fields::REGION, FieldKind::Region)
}

pub fn handlers() -> Vec<TypeHandler> {
    vec![
        TypeHandler::new(RecordType::Match, contract(), match_key)
            .with_transform(convert_to_continent)
            .with_exact(match_exact),
        TypeHandler::new(RecordType::Timeline, contract(), timeline_key)
            .with_transform(convert_to_continent)
            .with_exact(timeline_exact),
    ]
}

pub fn service(store: Arc<dyn ByteStore>, policy: Arc<ExpiryPolicy>) -> KvDiskService {
    KvDiskService::new(NAME, store, policy, handlers())
}
