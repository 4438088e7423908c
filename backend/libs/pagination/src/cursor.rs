//! Opaque pagination cursor codec.
//!
//! Format: base64(STANDARD) over `"k:<sort_key>,id:<uuid>"`. The sort key is
//! an `i64` — timestamp dimensions are carried as microseconds since the
//! epoch, counter dimensions (like counts) as the raw count. The cursor is
//! opaque to clients and can evolve without breaking them.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Decode failures are typed so callers can distinguish a stale/corrupted
/// token from a real error. Handlers treat any of these as "start from the
/// first page" rather than failing the request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("cursor is not valid base64")]
    InvalidEncoding,

    #[error("cursor payload is malformed")]
    InvalidFormat,

    #[error("cursor sort key is not a valid integer")]
    InvalidSortKey,

    #[error("cursor id is not a valid UUID")]
    InvalidId,
}

/// Compound keyset cursor: the sort value of the last row returned plus its
/// id as the tie-break.
///
/// A cursor is only meaningful against the query that produced it (same
/// filter tier, same ordering attribute). Reusing a token against a
/// different query shape decodes fine but anchors into the wrong value
/// space; callers own that contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub sort_key: i64,
    pub id: Uuid,
}

impl Cursor {
    pub fn new(sort_key: i64, id: Uuid) -> Self {
        Self { sort_key, id }
    }

    /// Cursor for a timestamp-ordered dimension.
    pub fn from_timestamp(ts: DateTime<Utc>, id: Uuid) -> Self {
        Self {
            sort_key: ts.timestamp_micros(),
            id,
        }
    }

    /// Reinterpret the sort key as a timestamp. `None` if the value does
    /// not land in chrono's representable range.
    pub fn sort_key_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros(self.sort_key)
    }

    pub fn encode(&self) -> String {
        let payload = format!("k:{},id:{}", self.sort_key, self.id);
        general_purpose::STANDARD.encode(payload)
    }

    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let decoded = general_purpose::STANDARD
            .decode(token)
            .map_err(|_| CursorError::InvalidEncoding)?;
        let payload = String::from_utf8(decoded).map_err(|_| CursorError::InvalidEncoding)?;

        let (key_part, id_part) = payload.split_once(',').ok_or(CursorError::InvalidFormat)?;

        let sort_key = key_part
            .strip_prefix("k:")
            .ok_or(CursorError::InvalidFormat)?
            .parse::<i64>()
            .map_err(|_| CursorError::InvalidSortKey)?;

        let id = id_part
            .strip_prefix("id:")
            .ok_or(CursorError::InvalidFormat)?
            .parse::<Uuid>()
            .map_err(|_| CursorError::InvalidId)?;

        Ok(Self { sort_key, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let id = Uuid::new_v4();
        let cursor = Cursor::new(1_699_632_000_000_000, id);
        let decoded = Cursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_round_trip_extremes() {
        for sort_key in [i64::MIN, -1, 0, 1, i64::MAX] {
            let cursor = Cursor::new(sort_key, Uuid::nil());
            assert_eq!(Cursor::decode(&cursor.encode()).unwrap(), cursor);
        }
    }

    #[test]
    fn test_timestamp_round_trip() {
        let id = Uuid::new_v4();
        let ts = Utc::now();
        let cursor = Cursor::from_timestamp(ts, id);
        let decoded = Cursor::decode(&cursor.encode()).unwrap();
        // Microsecond precision is what the store keeps
        assert_eq!(
            decoded.sort_key_timestamp().unwrap().timestamp_micros(),
            ts.timestamp_micros()
        );
    }

    #[test]
    fn test_rejects_garbage_base64() {
        assert_eq!(
            Cursor::decode("!!not-base64!!"),
            Err(CursorError::InvalidEncoding)
        );
    }

    #[test]
    fn test_rejects_malformed_payload() {
        let token = general_purpose::STANDARD.encode("offset:42");
        assert_eq!(Cursor::decode(&token), Err(CursorError::InvalidFormat));
    }

    #[test]
    fn test_rejects_bad_sort_key() {
        let token = general_purpose::STANDARD.encode(format!("k:abc,id:{}", Uuid::nil()));
        assert_eq!(Cursor::decode(&token), Err(CursorError::InvalidSortKey));
    }

    #[test]
    fn test_rejects_bad_id() {
        let token = general_purpose::STANDARD.encode("k:5,id:not-a-uuid");
        assert_eq!(Cursor::decode(&token), Err(CursorError::InvalidId));
    }
}
