//! Record DTOs produced upstream and cached by riftstore.
//!
//! Each DTO carries the identity fields the cache derives keys from as typed
//! fields. Payload the cache never inspects is kept as typed fields where the
//! shape is stable and as a JSON map where it is not.

use crate::{CacheResult, Platform, RecordType, Region, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ============================================================================
// DTOS
// ============================================================================

/// Riot account. Identified by `puuid`, or by `game_name` + `tag_line`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    pub id: String,
    pub puuid: String,
    pub platform: Platform,
    pub profile_icon_id: i64,
    pub summoner_level: i64,
    pub revision_date: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDto {
    pub match_id: String,
    pub region: Region,
    pub game_creation: i64,
    pub game_duration: i64,
    pub game_version: String,
    /// Participant puuids in participant order.
    pub participants: Vec<String>,
    #[serde(default)]
    pub info: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDto {
    pub match_id: String,
    pub region: Region,
    pub frame_interval: i64,
    #[serde(default)]
    pub frames: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionRotationDto {
    pub platform: Platform,
    pub free_champion_ids: Vec<i64>,
    pub free_champion_ids_for_new_players: Vec<i64>,
    pub max_new_player_level: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionMasteryDto {
    pub puuid: String,
    pub champion_id: i64,
    pub platform: Platform,
    pub champion_level: i64,
    pub champion_points: i64,
    pub last_play_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGameParticipant {
    pub puuid: String,
    pub champion_id: i64,
    pub team_id: i64,
}

/// Live game a player is currently in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGameInfoDto {
    pub game_id: i64,
    pub platform: Platform,
    pub game_mode: String,
    pub game_start_time: i64,
    pub participants: Vec<CurrentGameParticipant>,
}

impl CurrentGameInfoDto {
    pub fn has_participant(&self, puuid: &str) -> bool {
        self.participants.iter().any(|p| p.puuid == puuid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardStatusDto {
    pub platform: Platform,
    pub name: String,
    pub locales: Vec<String>,
    #[serde(default)]
    pub incidents: Vec<Value>,
    #[serde(default)]
    pub maintenances: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueListDto {
    pub league_id: String,
    pub platform: Platform,
    pub queue: String,
    pub tier: String,
    pub name: String,
    #[serde(default)]
    pub entries: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchDto {
    pub name: String,
    pub start: i64,
    pub season: i64,
}

/// Global patch history. There is a single instance, not partitioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchListDto {
    pub patches: Vec<PatchDto>,
    /// Per-region start offsets in seconds.
    #[serde(default)]
    pub shifts: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionListDto {
    pub platform: Platform,
    pub versions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionListDto {
    pub platform: Platform,
    pub version: String,
    pub locale: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Aggregated champion statistics from the ChampionGG plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionGgDto {
    pub champion_id: i64,
    pub patch: String,
    pub elo: String,
    #[serde(default)]
    pub stats: Map<String, Value>,
}

// ============================================================================
// TYPE-TAGGED RECORD
// ============================================================================

/// Generates the type-tagged [`Record`] enum and its per-variant plumbing
/// from one `RecordType => Dto` table.
macro_rules! records {
    ($($variant:ident => $dto:ident),+ $(,)?) => {
        /// A type-tagged record value.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Record {
            $($variant($dto),)+
        }

        impl Record {
            /// The declared type of this record.
            pub fn record_type(&self) -> RecordType {
                match self {
                    $(Record::$variant(_) => RecordType::$variant,)+
                }
            }

            /// Serialize the inner DTO to JSON bytes.
            pub fn to_json(&self) -> CacheResult<Vec<u8>> {
                let result = match self {
                    $(Record::$variant(dto) => serde_json::to_vec(dto),)+
                };
                result.map_err(|e| {
                    StorageError::Serialization {
                        record_type: self.record_type(),
                        reason: e.to_string(),
                    }
                    .into()
                })
            }

            /// Decode JSON bytes as the DTO for `record_type`.
            pub fn from_json(record_type: RecordType, bytes: &[u8]) -> CacheResult<Self> {
                let decoded = match record_type {
                    $(RecordType::$variant => serde_json::from_slice::<$dto>(bytes).map(Record::$variant),)+
                };
                decoded.map_err(|e| {
                    StorageError::Deserialization {
                        record_type,
                        reason: e.to_string(),
                    }
                    .into()
                })
            }
        }

        $(
            impl From<$dto> for Record {
                fn from(dto: $dto) -> Self {
                    Record::$variant(dto)
                }
            }
        )+
    };
}

records! {
    Account => AccountDto,
    Summoner => SummonerDto,
    Match => MatchDto,
    Timeline => TimelineDto,
    ChampionRotation => ChampionRotationDto,
    ChampionMastery => ChampionMasteryDto,
    CurrentGame => CurrentGameInfoDto,
    ShardStatus => ShardStatusDto,
    LeagueList => LeagueListDto,
    PatchList => PatchListDto,
    VersionList => VersionListDto,
    ChampionList => ChampionListDto,
    ChampionGg => ChampionGgDto,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CacheError;

    fn account() -> AccountDto {
        AccountDto {
            puuid: "0a1b2c3d-puuid".to_string(),
            game_name: "Foo Bar".to_string(),
            tag_line: "NA1".to_string(),
            region: Region::NorthAmerica,
        }
    }

    #[test]
    fn test_record_type_tag() {
        let record = Record::from(account());
        assert_eq!(record.record_type(), RecordType::Account);
    }

    #[test]
    fn test_json_roundtrip() {
        let record = Record::from(account());
        let bytes = record.to_json().expect("serialize should succeed");
        let decoded =
            Record::from_json(RecordType::Account, &bytes).expect("deserialize should succeed");
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_account_json_uses_camel_case() {
        let bytes = Record::from(account()).to_json().expect("serialize should succeed");
        let value: Value = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(value["gameName"], "Foo Bar");
        assert_eq!(value["tagLine"], "NA1");
        assert_eq!(value["region"], "NA");
    }

    #[test]
    fn test_from_json_wrong_type_fails() {
        let bytes = Record::from(account()).to_json().expect("serialize should succeed");
        let err = Record::from_json(RecordType::Match, &bytes).expect_err("shape mismatch");
        assert!(matches!(
            err,
            CacheError::Storage(StorageError::Deserialization {
                record_type: RecordType::Match,
                ..
            })
        ));
    }

    #[test]
    fn test_current_game_participant_lookup() {
        let game = CurrentGameInfoDto {
            game_id: 42,
            platform: Platform::Euw1,
            game_mode: "CLASSIC".to_string(),
            game_start_time: 0,
            participants: vec![CurrentGameParticipant {
                puuid: "p1".to_string(),
                champion_id: 1,
                team_id: 100,
            }],
        };
        assert!(game.has_participant("p1"));
        assert!(!game.has_participant("p2"));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn float_map(key: &str, value: f64) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(key.to_string(), Value::from(value));
        map
    }

    fn roundtrip(record: Record) -> Record {
        let bytes = record.to_json().expect("serialize should succeed");
        Record::from_json(record.record_type(), &bytes).expect("deserialize should succeed")
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Property: Win rates survive serialization bit for bit.
        #[test]
        fn prop_stats_floats_roundtrip(rate in 0.0f64..100.0) {
            let record = Record::from(ChampionGgDto {
                champion_id: 103,
                patch: "14.2".to_string(),
                elo: "PLATINUM".to_string(),
                stats: float_map("winRate", rate),
            });
            prop_assert_eq!(roundtrip(record.clone()), record);
        }

        /// Property: Any finite float in match info survives serialization.
        #[test]
        fn prop_info_floats_roundtrip(
            value in proptest::num::f64::NORMAL
                | proptest::num::f64::SUBNORMAL
                | proptest::num::f64::ZERO,
        ) {
            let record = Record::from(MatchDto {
                match_id: "NA1_1".to_string(),
                region: Region::NorthAmerica,
                game_creation: 0,
                game_duration: 1800,
                game_version: "14.2.1".to_string(),
                participants: vec!["p1".to_string()],
                info: float_map("v", value),
            });
            prop_assert_eq!(roundtrip(record.clone()), record);
        }
    }

    #[test]
    fn test_known_lossy_float_roundtrips() {
        for value in [12.874560591713891, 1.0715660391465826e-75] {
            let record = Record::from(ChampionGgDto {
                champion_id: 1,
                patch: "14.2".to_string(),
                elo: "GOLD".to_string(),
                stats: float_map("winRate", value),
            });
            let Record::ChampionGg(decoded) = roundtrip(record) else {
                panic!("record type changed");
            };
            assert_eq!(decoded.stats["winRate"].as_f64(), Some(value));
        }
    }
}
