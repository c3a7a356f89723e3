//! Error types for riftstore operations

use crate::RecordType;
use thiserror::Error;

/// Query validation errors. Raised before any storage access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Query for {record_type} is missing required fields: {missing:?}")]
    MissingFields {
        record_type: RecordType,
        missing: Vec<String>,
    },

    #[error("Invalid value for query field {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Backend operation failed: {reason}")]
    Backend { reason: String },

    #[error("Serialization failed for {record_type}: {reason}")]
    Serialization {
        record_type: RecordType,
        reason: String,
    },

    #[error("Deserialization failed for {record_type}: {reason}")]
    Deserialization {
        record_type: RecordType,
        reason: String,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Master error type for all riftstore errors.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error("No fresh {record_type} entry matches the query")]
    NotFound { record_type: RecordType },

    #[error("Operation not implemented: {operation}")]
    NotImplemented { operation: &'static str },

    #[error("No service handles record type {record_type}")]
    UnsupportedType { record_type: RecordType },

    #[error("Invalid {record_type} record: {reason}")]
    InvalidRecord {
        record_type: RecordType,
        reason: String,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl CacheError {
    /// True for the "nothing cached" outcome a pipeline falls through on.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }
}

/// Result type alias for riftstore operations.
pub type CacheResult<T> = Result<T, CacheError>;

// =============================================================================
// TESTS
// =============================================================================
