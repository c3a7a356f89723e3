//! Cache configuration.
//!
//! Loaded from TOML. `path` and `map_size_mb` are required; an absent
//! `expirations` table means nothing expires and an absent `plugins` list
//! enables no optional services.

use crate::{ConfigError, RecordType};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long entries of one record type stay fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Entries never go stale.
    Never,
    /// Entries go stale once older than the duration.
    After(Duration),
    /// Entries of this type are not written at all.
    Disabled,
}

impl Expiration {
    /// Interpret a configured number of seconds: negative never expires,
    /// zero disables caching, positive is a TTL.
    pub fn from_seconds(seconds: i64) -> Self {
        match seconds {
            s if s < 0 => Expiration::Never,
            0 => Expiration::Disabled,
            s => Expiration::After(Duration::from_secs(s.unsigned_abs())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Directory holding the LMDB environment.
    pub path: PathBuf,
    pub map_size_mb: usize,
    /// Record type name → TTL seconds.
    #[serde(default)]
    pub expirations: BTreeMap<String, i64>,
    /// Optional plugin services to enable, by name.
    #[serde(default)]
    pub plugins: Vec<String>,
}

impl CacheConfig {
    pub fn new(path: impl Into<PathBuf>, map_size_mb: usize) -> Self {
        Self {
            path: path.into(),
            map_size_mb,
            expirations: BTreeMap::new(),
            plugins: Vec::new(),
        }
    }

    pub fn with_expiration(mut self, record_type: RecordType, seconds: i64) -> Self {
        self.expirations
            .insert(record_type.type_name().to_string(), seconds);
        self
    }

    pub fn with_plugin(mut self, name: impl Into<String>) -> Self {
        self.plugins.push(name.into());
        self
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: CacheConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.map_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "map_size_mb".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        self.expirations()?;
        if let Some(blank) = self.plugins.iter().find(|p| p.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "plugins".to_string(),
                reason: format!("plugin name must not be empty: {:?}", blank),
            });
        }
        Ok(())
    }

    /// Resolve the `expirations` table into typed entries.
    pub fn expirations(&self) -> Result<HashMap<RecordType, Expiration>, ConfigError> {
        self.expirations
            .iter()
            .map(|(name, seconds)| {
                let record_type: RecordType =
                    name.parse().map_err(|reason| ConfigError::InvalidValue {
                        field: format!("expirations.{}", name),
                        reason,
                    })?;
                Ok((record_type, Expiration::from_seconds(*seconds)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
path = "/var/cache/riftstore"
map_size_mb = 64
plugins = ["ChampionGG"]

[expirations]
AccountDto = 86400
MatchDto = -1
ShardStatusDto = 0
"#;

    #[test]
    fn test_parse_sample() {
        let config = CacheConfig::from_toml_str(SAMPLE).expect("sample config should parse");
        assert_eq!(config.path, PathBuf::from("/var/cache/riftstore"));
        assert_eq!(config.map_size_mb, 64);
        assert_eq!(config.plugins, vec!["ChampionGG".to_string()]);

        let expirations = config.expirations().expect("known type names");
        assert_eq!(
            expirations.get(&RecordType::Account),
            Some(&Expiration::After(Duration::from_secs(86400)))
        );
        assert_eq!(expirations.get(&RecordType::Match), Some(&Expiration::Never));
        assert_eq!(
            expirations.get(&RecordType::ShardStatus),
            Some(&Expiration::Disabled)
        );
        assert_eq!(expirations.get(&RecordType::Summoner), None);
    }

    #[test]
    fn test_defaults_for_optional_tables() {
        let config = CacheConfig::from_toml_str("path = \"/tmp/c\"\nmap_size_mb = 1\n")
            .expect("minimal config should parse");
        assert!(config.expirations.is_empty());
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn test_unknown_type_name_rejected() {
        let raw = "path = \"/tmp/c\"\nmap_size_mb = 1\n[expirations]\nWidgetDto = 5\n";
        let err = CacheConfig::from_toml_str(raw).expect_err("unknown type");
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "expirations.WidgetDto"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let raw = "path = \"/tmp/c\"\nmap_size_mb = 1\nttl = 5\n";
        assert!(matches!(
            CacheConfig::from_toml_str(raw),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_zero_map_size_rejected() {
        let err = CacheConfig::new("/tmp/c", 0).validate().expect_err("zero map size");
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "map_size_mb"));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::TempDir::new().expect("TempDir creation should succeed");
        let path = dir.path().join("riftstore.toml");
        let mut file = std::fs::File::create(&path).expect("create config file");
        file.write_all(SAMPLE.as_bytes()).expect("write config file");

        let config = CacheConfig::from_path(&path).expect("config should load");
        assert_eq!(config.map_size_mb, 64);
    }

    #[test]
    fn test_builder_helpers() {
        let config = CacheConfig::new("/tmp/c", 8)
            .with_expiration(RecordType::Summoner, 3600)
            .with_plugin("ChampionGG");
        assert!(config.validate().is_ok());
        assert_eq!(config.expirations.get("SummonerDto"), Some(&3600));
    }

    #[test]
    fn test_expiration_from_seconds() {
        assert_eq!(Expiration::from_seconds(-1), Expiration::Never);
        assert_eq!(Expiration::from_seconds(0), Expiration::Disabled);
        assert_eq!(
            Expiration::from_seconds(30),
            Expiration::After(Duration::from_secs(30))
        );
    }
}
