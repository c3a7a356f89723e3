//! Queries and query contracts.
//!
//! A [`Query`] is a field-name → JSON value map. Each cached record type
//! declares a [`QueryContract`] describing which fields must be present
//! before a lookup may touch storage, and may pre-transform the query
//! (e.g. derive the continent from the region) before matching.

use crate::{CacheResult, Continent, Platform, QueryError, RecordType, Region};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Field name conventions shared by all services.
pub mod fields {
    pub const REGION: &str = "region";
    pub const PLATFORM: &str = "platform";
    pub const CONTINENT: &str = "continent";
    pub const ID: &str = "id";
    pub const PUUID: &str = "puuid";
    pub const GAME_NAME: &str = "gameName";
    pub const TAG_LINE: &str = "tagLine";
    pub const CHAMPION_ID: &str = "championId";
    pub const QUEUE: &str = "queue";
    pub const TIER: &str = "tier";
    pub const VERSION: &str = "version";
    pub const LOCALE: &str = "locale";
    pub const PATCH: &str = "patch";
    pub const ELO: &str = "elo";
}

// ============================================================================
// QUERY
// ============================================================================

/// A read request: field name → value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    fields: BTreeMap<String, Value>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.fields.get(field).and_then(Value::as_i64)
    }

    /// A string field that a validated contract guarantees to be present.
    pub fn str_field(&self, field: &str) -> CacheResult<&str> {
        self.get_str(field).ok_or_else(|| {
            QueryError::InvalidValue {
                field: field.to_string(),
                reason: "expected a string".to_string(),
            }
            .into()
        })
    }

    /// An integer field that a validated contract guarantees to be present.
    pub fn i64_field(&self, field: &str) -> CacheResult<i64> {
        self.get_i64(field).ok_or_else(|| {
            QueryError::InvalidValue {
                field: field.to_string(),
                reason: "expected an integer".to_string(),
            }
            .into()
        })
    }

    pub fn region(&self) -> CacheResult<Region> {
        parse_field(self, fields::REGION)
    }

    /// Platform derived by [`convert_region_to_platform`].
    pub fn platform(&self) -> CacheResult<Platform> {
        parse_field(self, fields::PLATFORM)
    }

    /// Continent derived by [`convert_to_continent`].
    pub fn continent(&self) -> CacheResult<Continent> {
        parse_field(self, fields::CONTINENT)
    }
}

fn parse_field<T>(query: &Query, field: &str) -> CacheResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw = query.str_field(field)?;
    raw.parse().map_err(|reason| {
        QueryError::InvalidValue {
            field: field.to_string(),
            reason,
        }
        .into()
    })
}

// ============================================================================
// TRANSFORMS
// ============================================================================

/// Rewrites a query before matching. Runs after validation.
pub type QueryTransform = fn(&mut Query) -> CacheResult<()>;

/// Adds `continent` derived from `region`.
pub fn convert_to_continent(query: &mut Query) -> CacheResult<()> {
    let continent = query.region()?.continent();
    query.insert(fields::CONTINENT, continent.as_str());
    Ok(())
}

/// Adds `platform` derived from `region`.
pub fn convert_region_to_platform(query: &mut Query) -> CacheResult<()> {
    let platform = query.region()?.platform();
    query.insert(fields::PLATFORM, platform.as_str());
    Ok(())
}

// ============================================================================
// CONTRACT
// ============================================================================

/// Expected kind of a query field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
    Region,
}

impl FieldKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::Str => value.as_str().is_some_and(|s| !s.trim().is_empty()),
            FieldKind::Int => value.is_i64(),
            FieldKind::Region => value
                .as_str()
                .map(|s| s.parse::<Region>().is_ok())
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Str => f.write_str("non-empty string"),
            FieldKind::Int => f.write_str("integer"),
            FieldKind::Region => f.write_str("region"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldRule {
    name: &'static str,
    kind: FieldKind,
}

/// Which fields a query must carry.
///
/// A contract is a conjunction of groups. A group is satisfied when any one
/// of its alternatives is fully present; an alternative is a set of fields
/// that must all be present.
///
/// ```
/// use riftstore_core::{FieldKind, QueryContract};
///
/// // puuid OR (gameName AND tagLine), and always region
/// let contract = QueryContract::has("puuid", FieldKind::Str)
///     .or("gameName", FieldKind::Str)
///     .and("tagLine", FieldKind::Str)
///     .also("region", FieldKind::Region);
/// # let _ = contract;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContract {
    groups: Vec<Vec<Vec<FieldRule>>>,
    optional: Vec<FieldRule>,
}

impl QueryContract {
    /// A contract every query satisfies.
    pub fn any() -> Self {
        Self::default()
    }

    /// Start a contract whose first group requires `name`.
    pub fn has(name: &'static str, kind: FieldKind) -> Self {
        Self::any().also(name, kind)
    }

    /// Start a new required group.
    pub fn also(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.groups.push(vec![vec![FieldRule { name, kind }]]);
        self
    }

    /// Add an alternative to the current group.
    pub fn or(mut self, name: &'static str, kind: FieldKind) -> Self {
        match self.groups.last_mut() {
            Some(group) => group.push(vec![FieldRule { name, kind }]),
            None => self.groups.push(vec![vec![FieldRule { name, kind }]]),
        }
        self
    }

    /// Require another field in the current alternative.
    pub fn and(mut self, name: &'static str, kind: FieldKind) -> Self {
        let rule = FieldRule { name, kind };
        match self.groups.last_mut().and_then(|g| g.last_mut()) {
            Some(alternative) => alternative.push(rule),
            None => self.groups.push(vec![vec![rule]]),
        }
        self
    }

    /// A field that may be absent but must have the right kind when present.
    pub fn maybe(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.optional.push(FieldRule { name, kind });
        self
    }

    /// Check `query` against this contract.
    pub fn validate(&self, record_type: RecordType, query: &Query) -> Result<(), QueryError> {
        let mut missing = Vec::new();

        for group in &self.groups {
            let satisfied = group
                .iter()
                .find(|alt| alt.iter().all(|rule| query.contains(rule.name)));

            match satisfied {
                Some(alternative) => {
                    for rule in alternative {
                        check_kind(query, rule)?;
                    }
                }
                None => missing.push(describe_group(group)),
            }
        }

        if !missing.is_empty() {
            return Err(QueryError::MissingFields {
                record_type,
                missing,
            });
        }

        for rule in &self.optional {
            if query.contains(rule.name) {
                check_kind(query, rule)?;
            }
        }

        Ok(())
    }
}

fn check_kind(query: &Query, rule: &FieldRule) -> Result<(), QueryError> {
    match query.get(rule.name) {
        Some(value) if rule.kind.accepts(value) => Ok(()),
        Some(value) => Err(QueryError::InvalidValue {
            field: rule.name.to_string(),
            reason: format!("expected {}, got {}", rule.kind, value),
        }),
        None => Err(QueryError::InvalidValue {
            field: rule.name.to_string(),
            reason: "missing".to_string(),
        }),
    }
}

/// Renders a group as `a | b+c` for error messages.
fn describe_group(group: &[Vec<FieldRule>]) -> String {
    group
        .iter()
        .map(|alt| {
            alt.iter()
                .map(|rule| rule.name)
                .collect::<Vec<_>>()
                .join("+")
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
