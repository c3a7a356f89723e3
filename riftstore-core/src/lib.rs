//! riftstore Core - Record Types
//!
//! Typed records, queries, errors and configuration shared by the cache.
//! No storage or I/O lives here apart from reading a config file.

mod config;
mod enums;
mod error;
mod query;
mod records;

pub use config::{CacheConfig, Expiration};
pub use enums::{Continent, Platform, RecordType, Region};
pub use error::{CacheError, CacheResult, ConfigError, QueryError, StorageError};
pub use query::{
    convert_region_to_platform, convert_to_continent, fields, FieldKind, Query, QueryContract,
    QueryTransform,
};
pub use records::{
    AccountDto, ChampionGgDto, ChampionListDto, ChampionMasteryDto, ChampionRotationDto,
    CurrentGameInfoDto, CurrentGameParticipant, LeagueListDto, MatchDto, PatchDto, PatchListDto,
    Record, ShardStatusDto, SummonerDto, TimelineDto, VersionListDto,
};
