//! Live game service.
//!
//! Games are keyed by game id but queried by a participant's puuid, so reads
//! scan the platform's games.

use std::sync::Arc;

use riftstore_core::{
    convert_region_to_platform, fields, CacheResult, FieldKind, Query, QueryContract, Record,
    RecordType,
};

use super::unexpected;
use crate::cache::{CacheKey, ExpiryPolicy, KvDiskService, Scan, TypeHandler};
use crate::ByteStore;

pub const NAME: &str = "spectator";

fn item_key(item: &Record) -> CacheResult<CacheKey> {
    match item {
        Record::CurrentGame(game) => Ok(CacheKey::builder(RecordType::CurrentGame)
            .partition(game.platform)
            .fragment(&game.game_id.to_string())
            .build()),
        other => Err(unexpected(RecordType::CurrentGame, other)),
    }
}

fn prefix(query: &Query) -> CacheResult<String> {
    Ok(CacheKey::builder(RecordType::CurrentGame)
        .partition(query.platform()?)
        .prefix())
}

fn matches(record: &Record, query: &Query) -> bool {
    match (record, query.get_str(fields::PUUID)) {
        (Record::CurrentGame(game), Some(puuid)) => game.has_participant(puuid),
        _ => false,
    }
}

pub fn handlers() -> Vec<TypeHandler> {
    let contract =
        QueryContract::has(fields::PUUID, FieldKind::Str).also(fields::REGION, FieldKind::Region);

    vec![TypeHandler::new(RecordType::CurrentGame, contract, item_key)
        .with_transform(convert_region_to_platform)
        .with_scan(Scan {
            prefix,
            candidate: |_, _| true,
            matches,
        })]
}

pub fn service(store: Arc<dyn ByteStore>, policy: Arc<ExpiryPolicy>) -> KvDiskService {
    KvDiskService::new(NAME, store, policy, handlers())
}
