//! riftstore Test Utilities
//!
//! Centralized test infrastructure for the riftstore workspace:
//! - Proptest generators for regions, identities and records
//! - Test fixtures for every cached record type
//! - Custom assertions for cache-specific errors

// Re-export core types for convenience
pub use riftstore_core::{
    AccountDto, CacheError, CacheResult, ChampionGgDto, ChampionListDto, ChampionMasteryDto,
    ChampionRotationDto, CurrentGameInfoDto, CurrentGameParticipant, LeagueListDto, MatchDto,
    PatchDto, PatchListDto, Platform, Query, Record, RecordType, Region, ShardStatusDto,
    SummonerDto, TimelineDto, VersionListDto,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_region() -> impl Strategy<Value = Region> {
        proptest::sample::select(Region::ALL.to_vec())
    }

    pub fn arb_platform() -> impl Strategy<Value = Platform> {
        arb_region().prop_map(Region::platform)
    }

    pub fn arb_record_type() -> impl Strategy<Value = RecordType> {
        proptest::sample::select(RecordType::ALL.to_vec())
    }

    /// 78-character ids shaped like Riot puuids.
    pub fn arb_puuid() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_-]{78}"
    }

    /// Human-entered names: letters, digits, inner spaces and a few
    /// non-ASCII characters.
    pub fn arb_game_name() -> impl Strategy<Value = String> {
        "[A-Za-z0-9äöü장][A-Za-z0-9 äöü장]{0,14}[A-Za-z0-9]"
    }

    pub fn arb_tag_line() -> impl Strategy<Value = String> {
        "[A-Za-z0-9]{2,5}"
    }

    pub fn arb_account() -> impl Strategy<Value = AccountDto> {
        (arb_puuid(), arb_game_name(), arb_tag_line(), arb_region()).prop_map(
            |(puuid, game_name, tag_line, region)| AccountDto {
                puuid,
                game_name,
                tag_line,
                region,
            },
        )
    }

    /// Case and whitespace variant of a name, seeded by `seed`.
    pub fn respell(name: &str, seed: u64) -> String {
        name.chars()
            .filter(|c| !c.is_whitespace())
            .enumerate()
            .map(|(i, c)| {
                let cased = if (seed >> (i % 64)) & 1 == 1 {
                    c.to_uppercase().collect::<String>()
                } else {
                    c.to_lowercase().collect::<String>()
                };
                if i % 4 == 3 {
                    format!(" {}", cased)
                } else {
                    cased
                }
            })
            .collect()
    }

    pub fn arb_match(region: Region) -> impl Strategy<Value = MatchDto> {
        ("[0-9]{6,10}", 60i64..4000).prop_map(move |(id, duration)| MatchDto {
            match_id: format!("{}_{}", region.platform(), id),
            region,
            game_creation: 1_700_000_000_000,
            game_duration: duration,
            game_version: "14.1.555.5555".to_string(),
            participants: Vec::new(),
            info: Default::default(),
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;
    use serde_json::{json, Map, Value};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    /// A fresh 64-hex-character puuid.
    pub fn random_puuid() -> String {
        format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        )
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    pub fn account(puuid: &str, game_name: &str, tag_line: &str, region: Region) -> AccountDto {
        AccountDto {
            puuid: puuid.to_string(),
            game_name: game_name.to_string(),
            tag_line: tag_line.to_string(),
            region,
        }
    }

    pub fn summoner(id: &str, puuid: &str, platform: Platform) -> SummonerDto {
        SummonerDto {
            id: id.to_string(),
            puuid: puuid.to_string(),
            platform,
            profile_icon_id: 4568,
            summoner_level: 312,
            revision_date: 1_700_000_000_000,
        }
    }

    pub fn match_dto(match_id: &str, region: Region) -> MatchDto {
        MatchDto {
            match_id: match_id.to_string(),
            region,
            game_creation: 1_700_000_000_000,
            game_duration: 1834,
            game_version: "14.1.555.5555".to_string(),
            participants: vec![random_puuid(), random_puuid()],
            info: object(json!({ "queueId": 420, "mapId": 11 })),
        }
    }

    pub fn timeline(match_id: &str, region: Region) -> TimelineDto {
        TimelineDto {
            match_id: match_id.to_string(),
            region,
            frame_interval: 60_000,
            frames: vec![json!({ "timestamp": 0 }), json!({ "timestamp": 60_000 })],
        }
    }

    pub fn champion_rotation(platform: Platform) -> ChampionRotationDto {
        ChampionRotationDto {
            platform,
            free_champion_ids: vec![1, 22, 103],
            free_champion_ids_for_new_players: vec![18, 81],
            max_new_player_level: 10,
        }
    }

    pub fn mastery(puuid: &str, champion_id: i64, platform: Platform) -> ChampionMasteryDto {
        ChampionMasteryDto {
            puuid: puuid.to_string(),
            champion_id,
            platform,
            champion_level: 7,
            champion_points: 250_000,
            last_play_time: 1_700_000_000_000,
        }
    }

    pub fn current_game(game_id: i64, platform: Platform, puuids: &[&str]) -> CurrentGameInfoDto {
        CurrentGameInfoDto {
            game_id,
            platform,
            game_mode: "CLASSIC".to_string(),
            game_start_time: 1_700_000_000_000,
            participants: puuids
                .iter()
                .enumerate()
                .map(|(i, puuid)| CurrentGameParticipant {
                    puuid: puuid.to_string(),
                    champion_id: 100 + i as i64,
                    team_id: if i < 5 { 100 } else { 200 },
                })
                .collect(),
        }
    }

    pub fn shard_status(platform: Platform) -> ShardStatusDto {
        ShardStatusDto {
            platform,
            name: format!("{} shard", platform),
            locales: vec!["en_US".to_string()],
            incidents: Vec::new(),
            maintenances: Vec::new(),
        }
    }

    pub fn league(league_id: &str, platform: Platform, queue: &str, tier: &str) -> LeagueListDto {
        LeagueListDto {
            league_id: league_id.to_string(),
            platform,
            queue: queue.to_string(),
            tier: tier.to_string(),
            name: "Ahri's Zealots".to_string(),
            entries: vec![json!({ "leaguePoints": 512 })],
        }
    }

    pub fn patch_list() -> PatchListDto {
        PatchListDto {
            patches: vec![
                PatchDto {
                    name: "14.1".to_string(),
                    start: 1_704_844_800,
                    season: 14,
                },
                PatchDto {
                    name: "14.2".to_string(),
                    start: 1_706_054_400,
                    season: 14,
                },
            ],
            shifts: BTreeMap::from([("NA".to_string(), 0), ("KR".to_string(), -46_800)]),
        }
    }

    pub fn versions(platform: Platform) -> VersionListDto {
        VersionListDto {
            platform,
            versions: vec!["14.2.1".to_string(), "14.1.1".to_string()],
        }
    }

    pub fn champion_list(platform: Platform, version: &str, locale: &str) -> ChampionListDto {
        ChampionListDto {
            platform,
            version: version.to_string(),
            locale: locale.to_string(),
            data: object(json!({ "Ahri": { "key": "103" } })),
        }
    }

    pub fn championgg(champion_id: i64, patch: &str, elo: &str) -> ChampionGgDto {
        ChampionGgDto {
            champion_id,
            patch: patch.to_string(),
            elo: elo.to_string(),
            stats: object(json!({ "winRate": 0.52, "playRate": 0.08 })),
        }
    }

    /// One record of every type, all on NA.
    pub fn one_of_each() -> Vec<Record> {
        let puuid = random_puuid();
        vec![
            account(&puuid, "Foo Bar", "NA1", Region::NorthAmerica).into(),
            summoner("summoner-1", &puuid, Platform::Na1).into(),
            match_dto("NA1_4242", Region::NorthAmerica).into(),
            timeline("NA1_4242", Region::NorthAmerica).into(),
            champion_rotation(Platform::Na1).into(),
            mastery(&puuid, 103, Platform::Na1).into(),
            current_game(77, Platform::Na1, &[puuid.as_str()]).into(),
            shard_status(Platform::Na1).into(),
            league("league-1", Platform::Na1, "RANKED_SOLO_5x5", "CHALLENGER").into(),
            patch_list().into(),
            versions(Platform::Na1).into(),
            champion_list(Platform::Na1, "14.2.1", "en_US").into(),
            championgg(103, "14.2", "PLATINUM").into(),
        ]
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    use super::*;

    /// Assert a result is `NotFound` for `record_type`.
    pub fn assert_not_found<T: std::fmt::Debug>(result: &CacheResult<T>, record_type: RecordType) {
        match result {
            Err(CacheError::NotFound { record_type: actual }) => assert_eq!(*actual, record_type),
            other => panic!("Expected NotFound for {}, got {:?}", record_type, other),
        }
    }

    pub fn assert_invalid_query<T: std::fmt::Debug>(result: &CacheResult<T>) {
        assert!(
            matches!(result, Err(CacheError::InvalidQuery(_))),
            "Expected InvalidQuery, got {:?}",
            result
        );
    }

    pub fn assert_not_implemented<T: std::fmt::Debug>(result: &CacheResult<T>) {
        assert!(
            matches!(result, Err(CacheError::NotImplemented { .. })),
            "Expected NotImplemented, got {:?}",
            result
        );
    }

    pub fn assert_unsupported<T: std::fmt::Debug>(result: &CacheResult<T>, record_type: RecordType) {
        match result {
            Err(CacheError::UnsupportedType { record_type: actual }) => {
                assert_eq!(*actual, record_type)
            }
            other => panic!("Expected UnsupportedType for {}, got {:?}", record_type, other),
        }
    }
}
