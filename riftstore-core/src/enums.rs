//! Enum types for riftstore records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// RECORD TYPES
// ============================================================================

/// Record type discriminator used for dispatch, key namespaces and TTL lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    Account,
    Summoner,
    Match,
    Timeline,
    ChampionRotation,
    ChampionMastery,
    CurrentGame,
    ShardStatus,
    LeagueList,
    PatchList,
    VersionList,
    ChampionList,
    ChampionGg,
}

impl RecordType {
    /// Every record type, in declaration order.
    pub const ALL: [RecordType; 13] = [
        RecordType::Account,
        RecordType::Summoner,
        RecordType::Match,
        RecordType::Timeline,
        RecordType::ChampionRotation,
        RecordType::ChampionMastery,
        RecordType::CurrentGame,
        RecordType::ShardStatus,
        RecordType::LeagueList,
        RecordType::PatchList,
        RecordType::VersionList,
        RecordType::ChampionList,
        RecordType::ChampionGg,
    ];

    /// Name used as the first cache key segment and in configuration files.
    pub fn type_name(self) -> &'static str {
        match self {
            RecordType::Account => "AccountDto",
            RecordType::Summoner => "SummonerDto",
            RecordType::Match => "MatchDto",
            RecordType::Timeline => "TimelineDto",
            RecordType::ChampionRotation => "ChampionRotationDto",
            RecordType::ChampionMastery => "ChampionMasteryDto",
            RecordType::CurrentGame => "CurrentGameInfoDto",
            RecordType::ShardStatus => "ShardStatusDto",
            RecordType::LeagueList => "LeagueListDto",
            RecordType::PatchList => "PatchListDto",
            RecordType::VersionList => "VersionListDto",
            RecordType::ChampionList => "ChampionListDto",
            RecordType::ChampionGg => "ChampionGgDto",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|rt| rt.type_name() == s)
            .ok_or_else(|| format!("unknown record type: {}", s))
    }
}

// ============================================================================
// GEOGRAPHY
// ============================================================================

/// Coarse routing partition. Cache keys for cross-platform data (accounts,
/// matches) are sharded by continent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Continent {
    Americas,
    Asia,
    Europe,
    Sea,
}

impl Continent {
    pub fn as_str(self) -> &'static str {
        match self {
            Continent::Americas => "AMERICAS",
            Continent::Asia => "ASIA",
            Continent::Europe => "EUROPE",
            Continent::Sea => "SEA",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Continent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AMERICAS" => Ok(Continent::Americas),
            "ASIA" => Ok(Continent::Asia),
            "EUROPE" => Ok(Continent::Europe),
            "SEA" => Ok(Continent::Sea),
            _ => Err(format!("unknown continent: {}", s)),
        }
    }
}

/// Game server platform (one per region).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "BR1")]
    Br1,
    #[serde(rename = "EUN1")]
    Eun1,
    #[serde(rename = "EUW1")]
    Euw1,
    #[serde(rename = "JP1")]
    Jp1,
    #[serde(rename = "KR")]
    Kr,
    #[serde(rename = "LA1")]
    La1,
    #[serde(rename = "LA2")]
    La2,
    #[serde(rename = "ME1")]
    Me1,
    #[serde(rename = "NA1")]
    Na1,
    #[serde(rename = "OC1")]
    Oc1,
    #[serde(rename = "PH2")]
    Ph2,
    #[serde(rename = "RU")]
    Ru,
    #[serde(rename = "SG2")]
    Sg2,
    #[serde(rename = "TH2")]
    Th2,
    #[serde(rename = "TR1")]
    Tr1,
    #[serde(rename = "TW2")]
    Tw2,
    #[serde(rename = "VN2")]
    Vn2,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Br1 => "BR1",
            Platform::Eun1 => "EUN1",
            Platform::Euw1 => "EUW1",
            Platform::Jp1 => "JP1",
            Platform::Kr => "KR",
            Platform::La1 => "LA1",
            Platform::La2 => "LA2",
            Platform::Me1 => "ME1",
            Platform::Na1 => "NA1",
            Platform::Oc1 => "OC1",
            Platform::Ph2 => "PH2",
            Platform::Ru => "RU",
            Platform::Sg2 => "SG2",
            Platform::Th2 => "TH2",
            Platform::Tr1 => "TR1",
            Platform::Tw2 => "TW2",
            Platform::Vn2 => "VN2",
        }
    }

    /// The region served by this platform.
    pub fn region(self) -> Region {
        match self {
            Platform::Br1 => Region::Brazil,
            Platform::Eun1 => Region::EuropeNorthEast,
            Platform::Euw1 => Region::EuropeWest,
            Platform::Jp1 => Region::Japan,
            Platform::Kr => Region::Korea,
            Platform::La1 => Region::LatinAmericaNorth,
            Platform::La2 => Region::LatinAmericaSouth,
            Platform::Me1 => Region::MiddleEast,
            Platform::Na1 => Region::NorthAmerica,
            Platform::Oc1 => Region::Oceania,
            Platform::Ph2 => Region::Philippines,
            Platform::Ru => Region::Russia,
            Platform::Sg2 => Region::Singapore,
            Platform::Th2 => Region::Thailand,
            Platform::Tr1 => Region::Turkey,
            Platform::Tw2 => Region::Taiwan,
            Platform::Vn2 => Region::Vietnam,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Region::ALL
            .into_iter()
            .map(Region::platform)
            .find(|p| p.as_str() == upper)
            .ok_or_else(|| format!("unknown platform: {}", s))
    }
}

/// Player-facing region. Every region maps to exactly one platform and one
/// continent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "BR")]
    Brazil,
    #[serde(rename = "EUNE")]
    EuropeNorthEast,
    #[serde(rename = "EUW")]
    EuropeWest,
    #[serde(rename = "JP")]
    Japan,
    #[serde(rename = "KR")]
    Korea,
    #[serde(rename = "LAN")]
    LatinAmericaNorth,
    #[serde(rename = "LAS")]
    LatinAmericaSouth,
    #[serde(rename = "ME")]
    MiddleEast,
    #[serde(rename = "NA")]
    NorthAmerica,
    #[serde(rename = "OCE")]
    Oceania,
    #[serde(rename = "PH")]
    Philippines,
    #[serde(rename = "RU")]
    Russia,
    #[serde(rename = "SG")]
    Singapore,
    #[serde(rename = "TH")]
    Thailand,
    #[serde(rename = "TR")]
    Turkey,
    #[serde(rename = "TW")]
    Taiwan,
    #[serde(rename = "VN")]
    Vietnam,
}

impl Region {
    pub const ALL: [Region; 17] = [
        Region::Brazil,
        Region::EuropeNorthEast,
        Region::EuropeWest,
        Region::Japan,
        Region::Korea,
        Region::LatinAmericaNorth,
        Region::LatinAmericaSouth,
        Region::MiddleEast,
        Region::NorthAmerica,
        Region::Oceania,
        Region::Philippines,
        Region::Russia,
        Region::Singapore,
        Region::Thailand,
        Region::Turkey,
        Region::Taiwan,
        Region::Vietnam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Brazil => "BR",
            Region::EuropeNorthEast => "EUNE",
            Region::EuropeWest => "EUW",
            Region::Japan => "JP",
            Region::Korea => "KR",
            Region::LatinAmericaNorth => "LAN",
            Region::LatinAmericaSouth => "LAS",
            Region::MiddleEast => "ME",
            Region::NorthAmerica => "NA",
            Region::Oceania => "OCE",
            Region::Philippines => "PH",
            Region::Russia => "RU",
            Region::Singapore => "SG",
            Region::Thailand => "TH",
            Region::Turkey => "TR",
            Region::Taiwan => "TW",
            Region::Vietnam => "VN",
        }
    }

    pub fn platform(self) -> Platform {
        match self {
            Region::Brazil => Platform::Br1,
            Region::EuropeNorthEast => Platform::Eun1,
            Region::EuropeWest => Platform::Euw1,
            Region::Japan => Platform::Jp1,
            Region::Korea => Platform::Kr,
            Region::LatinAmericaNorth => Platform::La1,
            Region::LatinAmericaSouth => Platform::La2,
            Region::MiddleEast => Platform::Me1,
            Region::NorthAmerica => Platform::Na1,
            Region::Oceania => Platform::Oc1,
            Region::Philippines => Platform::Ph2,
            Region::Russia => Platform::Ru,
            Region::Singapore => Platform::Sg2,
            Region::Thailand => Platform::Th2,
            Region::Turkey => Platform::Tr1,
            Region::Taiwan => Platform::Tw2,
            Region::Vietnam => Platform::Vn2,
        }
    }

    pub fn continent(self) -> Continent {
        match self {
            Region::Brazil
            | Region::LatinAmericaNorth
            | Region::LatinAmericaSouth
            | Region::NorthAmerica => Continent::Americas,
            Region::Japan | Region::Korea => Continent::Asia,
            Region::EuropeNorthEast
            | Region::EuropeWest
            | Region::MiddleEast
            | Region::Russia
            | Region::Turkey => Continent::Europe,
            Region::Oceania
            | Region::Philippines
            | Region::Singapore
            | Region::Thailand
            | Region::Taiwan
            | Region::Vietnam => Continent::Sea,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Region::ALL
            .into_iter()
            .find(|r| r.as_str() == upper)
            .ok_or_else(|| format!("unknown region: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_name_roundtrip() {
        for rt in RecordType::ALL {
            let parsed: RecordType = rt.type_name().parse().expect("type name should parse");
            assert_eq!(parsed, rt);
        }
        assert!("NotADto".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_region_parse_is_case_insensitive() {
        assert_eq!("na".parse::<Region>(), Ok(Region::NorthAmerica));
        assert_eq!("EUW".parse::<Region>(), Ok(Region::EuropeWest));
        assert!("atlantis".parse::<Region>().is_err());
    }

    #[test]
    fn test_region_platform_roundtrip() {
        for region in Region::ALL {
            assert_eq!(region.platform().region(), region);
        }
    }

    #[test]
    fn test_continent_mapping() {
        assert_eq!(Region::NorthAmerica.continent(), Continent::Americas);
        assert_eq!(Region::LatinAmericaSouth.continent(), Continent::Americas);
        assert_eq!(Region::Korea.continent(), Continent::Asia);
        assert_eq!(Region::Turkey.continent(), Continent::Europe);
        assert_eq!(Region::Vietnam.continent(), Continent::Sea);
    }

    #[test]
    fn test_region_serde_uses_short_codes() {
        let json = serde_json::to_string(&Region::EuropeNorthEast).expect("serialize region");
        assert_eq!(json, "\"EUNE\"");
        let platform: Platform = serde_json::from_str("\"NA1\"").expect("deserialize platform");
        assert_eq!(platform, Platform::Na1);
    }
}
