//! On-disk entry layout.
//!
//! Format: `[written_at: 8 bytes, i64 little-endian unix millis][JSON payload]`.
//! The timestamp leads so a sweep can judge staleness without decoding the
//! payload.

use chrono::{DateTime, Utc};

/// Byte length of the timestamp header.
pub const HEADER_LEN: usize = 8;

/// A serialized record plus the time it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    written_at: DateTime<Utc>,
    payload: Vec<u8>,
}

impl StoredEntry {
    pub fn new(written_at: DateTime<Utc>, payload: Vec<u8>) -> Self {
        Self {
            written_at,
            payload,
        }
    }

    pub fn written_at(&self) -> DateTime<Utc> {
        self.written_at
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.payload.len());
        bytes.extend_from_slice(&self.written_at.timestamp_millis().to_le_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Returns `None` when the bytes are too short to hold a header or the
    /// timestamp is out of range.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let written_at = Self::written_at_of(bytes)?;
        Some(Self {
            written_at,
            payload: bytes[HEADER_LEN..].to_vec(),
        })
    }

    /// Read only the header timestamp.
    pub fn written_at_of(bytes: &[u8]) -> Option<DateTime<Utc>> {
        let header: [u8; HEADER_LEN] = bytes.get(..HEADER_LEN)?.try_into().ok()?;
        DateTime::from_timestamp_millis(i64::from_le_bytes(header))
    }
}
