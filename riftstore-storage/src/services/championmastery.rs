//! Champion mastery service.
//!
//! One entry per (platform, player, champion). With a `championId` the
//! lookup is exact; without one, every mastery of the player is scanned.

use std::sync::Arc;

use riftstore_core::{
    convert_region_to_platform, fields, CacheResult, FieldKind, Query, QueryContract, Record,
    RecordType,
};

use super::{required, unexpected};
use crate::cache::{CacheKey, CacheKeyBuilder, ExpiryPolicy, KvDiskService, Scan, TypeHandler};
use crate::ByteStore;

pub const NAME: &str = "championmastery";

fn player(query: &Query) -> CacheResult<CacheKeyBuilder> {
    Ok(CacheKey::builder(RecordType::ChampionMastery)
        .partition(query.platform()?)
        .fragment(query.str_field(fields::PUUID)?))
}

fn item_key(item: &Record) -> CacheResult<CacheKey> {
    let Record::ChampionMastery(mastery) = item else {
        return Err(unexpected(RecordType::ChampionMastery, item));
    };
    Ok(CacheKey::builder(RecordType::ChampionMastery)
        .partition(mastery.platform)
        .fragment(required(RecordType::ChampionMastery, "puuid", &mastery.puuid)?)
        .fragment(&mastery.champion_id.to_string())
        .build())
}

fn exact(query: &Query) -> CacheResult<Option<CacheKey>> {
    match query.get_i64(fields::CHAMPION_ID) {
        Some(champion_id) => Ok(Some(player(query)?.fragment(&champion_id.to_string()).build())),
        None => Ok(None),
    }
}

fn prefix(query: &Query) -> CacheResult<String> {
    Ok(player(query)?.prefix())
}

fn matches(record: &Record, query: &Query) -> bool {
    matches!(
        record,
        Record::ChampionMastery(m) if query.get_str(fields::PUUID) == Some(m.puuid.as_str())
    )
}

pub fn handlers() -> Vec<TypeHandler> {
    let contract = QueryContract::has(fields::PUUID, FieldKind::Str)
        .also(fields::REGION, FieldKind::Region)
        .maybe(fields::CHAMPION_ID, FieldKind::Int);

    vec![TypeHandler::new(RecordType::ChampionMastery, contract, item_key)
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
