//! Canonical cache keys.
//!
//! A key is `{TypeName}.{partition}.{fragment}...` joined with `.`. The type
//! name comes first so that every record type owns a contiguous key
//! namespace that `clear` and `expire` can scan.
//!
//! Two fragment flavours exist:
//! - identity fragments ([`CacheKeyBuilder::identity`]) for human-entered
//!   names: whitespace stripped, lower-cased, then hex-encoded so unicode and
//!   separator characters never reach the key;
//! - opaque fragments ([`CacheKeyBuilder::fragment`]) for ids, escaped so
//!   they cannot contain the separator.

use std::fmt;

use riftstore_core::RecordType;

/// Separator between key segments.
pub const SEPARATOR: char = '.';

/// Length that high-entropy ids are truncated to inside keys.
pub const ID_PREFIX_LEN: usize = 8;

/// Partition segment for record types that are not geographically sharded.
pub const GLOBAL_PARTITION: &str = "global";

/// A canonical cache key.
///
/// Only constructible through [`CacheKey::builder`] or [`CacheKey::parse`],
/// so every key carries a valid type-name segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    record_type: RecordType,
    encoded: String,
}

impl CacheKey {
    /// Start a key in `record_type`'s namespace.
    pub fn builder(record_type: RecordType) -> CacheKeyBuilder {
        CacheKeyBuilder {
            record_type,
            encoded: record_type.type_name().to_string(),
        }
    }

    /// Prefix shared by every key of `record_type`.
    pub fn type_prefix(record_type: RecordType) -> String {
        format!("{}{}", record_type.type_name(), SEPARATOR)
    }

    /// Parse a stored key. Returns `None` if the type segment is unknown.
    pub fn parse(raw: &str) -> Option<Self> {
        let type_name = raw.split(SEPARATOR).next()?;
        let record_type = type_name.parse().ok()?;
        Some(Self {
            record_type,
            encoded: raw.to_string(),
        })
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn into_string(self) -> String {
        self.encoded
    }

    /// Segments after the type name.
    pub fn segments(&self) -> Vec<&str> {
        self.encoded.split(SEPARATOR).skip(1).collect()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Incrementally appends segments to a key.
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    record_type: RecordType,
    encoded: String,
}

impl CacheKeyBuilder {
    /// Append a partition segment (continent, platform or `global`).
    pub fn partition(self, partition: impl fmt::Display) -> Self {
        self.push(&partition.to_string())
    }

    /// Append an opaque id, escaped.
    pub fn fragment(self, id: &str) -> Self {
        self.push(&escape_fragment(id))
    }

    /// Append the first `len` characters of an id, escaped.
    pub fn truncated(self, id: &str, len: usize) -> Self {
        self.push(&escape_fragment(truncate_id(id, len)))
    }

    /// Append a normalized human-entered name.
    pub fn identity(self, value: &str) -> Self {
        self.push(&normalize_identity(value))
    }

    fn push(mut self, segment: &str) -> Self {
        self.encoded.push(SEPARATOR);
        self.encoded.push_str(segment);
        self
    }

    pub fn build(self) -> CacheKey {
        CacheKey {
            record_type: self.record_type,
            encoded: self.encoded,
        }
    }

    /// The segments so far plus a trailing separator, for prefix scans.
    pub fn prefix(self) -> String {
        let mut prefix = self.encoded;
        prefix.push(SEPARATOR);
        prefix
    }
}

/// Strip all whitespace, lower-case, then hex-encode the UTF-8 bytes.
pub fn normalize_identity(value: &str) -> String {
    let squashed: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    hex::encode(squashed.as_bytes())
}

/// Escape `%` and the separator so an id occupies exactly one segment.
pub fn escape_fragment(id: &str) -> String {
    let mut escaped = String::with_capacity(id.len());
    for c in id.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            SEPARATOR => escaped.push_str("%2E"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// First `len` characters of `id`, never splitting a character.
pub fn truncate_id(id: &str, len: usize) -> &str {
    match id.char_indices().nth(len) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
