//! Account service.
//!
//! Accounts are found either by `puuid` or by the pair `gameName` +
//! `tagLine`, so there is no single key to look up. Keys embed a truncated
//! puuid and both normalized names, and reads scan the continent's accounts:
//! the key segments pick candidates, the decoded record confirms them.

use std::sync::Arc;

use riftstore_core::{
    convert_to_continent, fields, CacheResult, FieldKind, Query, QueryContract, Record,
    RecordType,
};

use super::{required, unexpected};
use crate::cache::key::{escape_fragment, normalize_identity, truncate_id, ID_PREFIX_LEN};
use crate::cache::{CacheKey, ExpiryPolicy, KvDiskService, Scan, TypeHandler};
use crate::ByteStore;

pub const NAME: &str = "account";

fn item_key(item: &Record) -> CacheResult<CacheKey> {
    let Record::Account(account) = item else {
        return Err(unexpected(RecordType::Account, item));
    };
    let puuid = required(RecordType::Account, "puuid", &account.puuid)?;
    Ok(CacheKey::builder(RecordType::Account)
        .partition(account.region.continent())
        .truncated(puuid, ID_PREFIX_LEN)
        .identity(&account.game_name)
        .identity(&account.tag_line)
        .build())
}

fn prefix(query: &Query) -> CacheResult<String> {
    Ok(CacheKey::builder(RecordType::Account)
        .partition(query.continent()?)
        .prefix())
}

/// Key segments: continent, puuid prefix, name, tag.
fn candidate(key: &CacheKey, query: &Query) -> bool {
    let segments = key.segments();
    let [_, puuid_prefix, name, tag] = segments.as_slice() else {
        return false;
    };

    let by_puuid = query
        .get_str(fields::PUUID)
        .map(|puuid| *puuid_prefix == escape_fragment(truncate_id(puuid, ID_PREFIX_LEN)))
        .unwrap_or(false);

    by_puuid || name_and_tag(query).map_or(false, |(n, t)| *name == n && *tag == t)
}

fn matches(record: &Record, query: &Query) -> bool {
    let Record::Account(account) = record else {
        return false;
    };

    let by_puuid = query.get_str(fields::PUUID) == Some(account.puuid.as_str());

    by_puuid
        || name_and_tag(query).map_or(false, |(name, tag)| {
            normalize_identity(&account.game_name) == name
                && normalize_identity(&account.tag_line) == tag
        })
}

/// Normalized `gameName` and `tagLine`, when the query has both.
fn name_and_tag(query: &Query) -> Option<(String, String)> {
    let name = query.get_str(fields::GAME_NAME)?;
    let tag = query.get_str(fields::TAG_LINE)?;
    Some((normalize_identity(name), normalize_identity(tag)))
}

pub fn handlers() -> Vec<TypeHandler> {
    let contract = QueryContract::has(fields::PUUID, FieldKind::Str)
        .or(fields::GAME_NAME, FieldKind::Str)
        .and(fields::TAG_LINE, FieldKind::Str)
        .also(fields::REGION, FieldKind::Region);

    vec![TypeHandler::new(RecordType::Account, contract, item_key)
        .with_transform(convert_to_continent)
        .with_scan(Scan {
            prefix,
            candidate,
            matches,
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
    use riftstore_core::{CacheError, Region};
    use riftstore_test_utils::assertions::{assert_invalid_query, assert_not_found};
    use riftstore_test_utils::fixtures;

    fn setup() -> (InMemoryByteStore, KvDiskService) {
        let store = InMemoryByteStore::new();
        let service = service(Arc::new(store.clone()), Arc::new(ExpiryPolicy::never()));
        (store, service)
    }

    #[test]
    fn test_key_layout() {
        let account = fixtures::account("abcdefghijklmnop", "Foo Bar", "NA1", Region::NorthAmerica);
        let key = item_key(&account.into()).expect("key");
        assert_eq!(
            key.as_str(),
            format!(
                "AccountDto.AMERICAS.abcdefgh.{}.{}",
                hex_of("foobar"),
                hex_of("na1")
            )
        );
    }

    fn hex_of(s: &str) -> String {
        s.bytes().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn test_empty_puuid_is_invalid() {
        let account = fixtures::account("", "Foo", "NA1", Region::NorthAmerica);
        assert!(matches!(
            item_key(&account.into()),
            Err(CacheError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_found_by_normalized_name() {
        let (_store, service) = setup();
        let account = fixtures::account(&fixtures::random_puuid(), "Foo Bar", "NA1", Region::NorthAmerica);
        service.put(&account.clone().into()).expect("put");

        let query = Query::new()
            .with(fields::GAME_NAME, "foobar")
            .with(fields::TAG_LINE, "NA1")
            .with(fields::REGION, "LAN");
        assert_eq!(
            service.get(RecordType::Account, &query).expect("found by name"),
            Record::Account(account)
        );
    }

    #[test]
    fn test_found_by_puuid() {
        let (_store, service) = setup();
        let puuid = fixtures::random_puuid();
        let account = fixtures::account(&puuid, "Faker", "KR1", Region::Korea);
        service.put(&account.clone().into()).expect("put");

        let query = Query::new()
            .with(fields::PUUID, puuid.as_str())
            .with(fields::REGION, "JP");
        assert_eq!(
            service.get(RecordType::Account, &query).expect("found by puuid"),
            Record::Account(account)
        );
    }

    #[test]
    fn test_truncated_puuid_collision_is_rechecked() {
        let (_store, service) = setup();
        let stored = fixtures::account("SAMEPREFIX-one", "Alpha", "EUW", Region::EuropeWest);
        service.put(&stored.into()).expect("put");

        let query = Query::new()
            .with(fields::PUUID, "SAMEPREFIX-two")
            .with(fields::REGION, "EUW");
        assert_not_found(&service.get(RecordType::Account, &query), RecordType::Account);
    }

    #[test]
    fn test_name_requires_matching_tag() {
        let (_store, service) = setup();
        let account = fixtures::account(&fixtures::random_puuid(), "Foo Bar", "NA1", Region::NorthAmerica);
        service.put(&account.into()).expect("put");

        let query = Query::new()
            .with(fields::GAME_NAME, "Foo Bar")
            .with(fields::TAG_LINE, "EUW")
            .with(fields::REGION, "NA");
        assert_not_found(&service.get(RecordType::Account, &query), RecordType::Account);
    }

    #[test]
    fn test_other_continent_is_not_scanned() {
        let (_store, service) = setup();
        let puuid = fixtures::random_puuid();
        service
            .put(&fixtures::account(&puuid, "Foo", "NA1", Region::NorthAmerica).into())
            .expect("put");

        let query = Query::new()
            .with(fields::PUUID, puuid.as_str())
            .with(fields::REGION, "EUW");
        assert_not_found(&service.get(RecordType::Account, &query), RecordType::Account);
    }

    #[test]
    fn test_name_without_tag_is_invalid() {
        let (_store, service) = setup();
        let query = Query::new()
            .with(fields::GAME_NAME, "Foo")
            .with(fields::REGION, "NA");
        assert_invalid_query(&service.get(RecordType::Account, &query));
    }

    #[test]
    fn test_get_many_returns_every_match() {
        let (_store, service) = setup();
        let puuid = fixtures::random_puuid();
        service
            .put_many(&[
                fixtures::account(&puuid, "Foo", "NA1", Region::NorthAmerica).into(),
                fixtures::account(&fixtures::random_puuid(), "Foo", "NA1", Region::Brazil).into(),
                fixtures::account(&fixtures::random_puuid(), "Other", "NA1", Region::NorthAmerica).into(),
            ])
            .expect("put_many");

        let query = Query::new()
            .with(fields::GAME_NAME, "FOO")
            .with(fields::TAG_LINE, "na1")
            .with(fields::REGION, "NA");
        let found = service
            .get_many(RecordType::Account, &query)
            .expect("get_many")
            .collect::<CacheResult<Vec<_>>>()
            .expect("decode");
        assert_eq!(found.len(), 2);
    }
}
