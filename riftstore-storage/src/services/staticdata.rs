//! Static game data: version lists and champion lists.

use std::sync::Arc;

use riftstore_core::{
    convert_region_to_platform, fields, CacheResult, FieldKind, Platform, Query, QueryContract,
    Record, RecordType,
};

use super::{required, unexpected};
use crate::cache::{CacheKey, ExpiryPolicy, KvDiskService, TypeHandler};
use crate::ByteStore;

pub const NAME: &str = "staticdata";

fn versions_key(platform: Platform) -> CacheKey {
    CacheKey::builder(RecordType::VersionList)
        .partition(platform)
        .build()
}

fn champions_key(platform: Platform, version: &str, locale: &str) -> CacheResult<CacheKey> {
    Ok(CacheKey::builder(RecordType::ChampionList)
        .partition(platform)
        .fragment(required(RecordType::ChampionList, "version", version)?)
        .fragment(required(RecordType::ChampionList, "locale", locale)?)
        .build())
}

fn versions_item_key(item: &Record) -> CacheResult<CacheKey> {
    match item {
        Record::VersionList(versions) => Ok(versions_key(versions.platform)),
        other => Err(unexpected(RecordType::VersionList, other)),
    }
}

fn champions_item_key(item: &Record) -> CacheResult<CacheKey> {
    match item {
        Record::ChampionList(list) => champions_key(list.platform, &list.version, &list.locale),
        other => Err(unexpected(RecordType::ChampionList, other)),
    }
}

fn versions_exact(query: &Query) -> CacheResult<Option<CacheKey>> {
    Ok(Some(versions_key(query.platform()?)))
}

fn champions_exact(query: &Query) -> CacheResult<Option<CacheKey>> {
    champions_key(
        query.platform()?,
        query.str_field(fields::VERSION)?,
        query.str_field(fields::LOCALE)?,
    )
    .map(Some)
}

pub fn handlers() -> Vec<TypeHandler> {
    vec![
        TypeHandler::new(
            RecordType::VersionList,
            QueryContract::has(fields::REGION, FieldKind::Region),
            versions_item_key,
        )
        .with_transform(convert_region_to_platform)
        .with_exact(versions_exact),
        TypeHandler::new(
            RecordType::ChampionList,
            QueryContract::has(fields::REGION, FieldKind::Region)
                .also(fields::VERSION, FieldKind::Str)
                .also(fields::LOCALE, FieldKind::Str),
            champions_item_key,
        )
        .with_transform(convert_region_to_platform)
        .with_exact(champions_exact),
    ]
}

pub fn service(store: Arc<dyn ByteStore>, policy: Arc<ExpiryPolicy>) -> KvDiskService {
    KvDiskService::new(NAME, store, policy, handlers())
}
