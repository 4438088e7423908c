use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use pagination::Cursor;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::UnitSystem;

pub mod health;
pub mod photos;
pub mod presence;
pub mod users;

pub use health::health_check;
pub use photos::{get_hot_today, get_new_photos, like_photo, set_profile_photo, unlike_photo};
pub use presence::heartbeat;
pub use users::{get_daily_sample, get_daily_top, get_new_users, get_online_users};

/// Decode a client-supplied cursor token. A stale or corrupted token means
/// "start from the first page", never a failed request.
pub(crate) fn decode_cursor_lenient(token: Option<&str>) -> Option<Cursor> {
    let token = token?;
    match Cursor::decode(token) {
        Ok(cursor) => Some(cursor),
        Err(e) => {
            warn!(error = %e, "discarding invalid cursor, restarting from first page");
            None
        }
    }
}

/// Cursor anchor for a timestamp-ordered listing. A sort key outside
/// chrono's range is treated like any other corrupt cursor.
pub(crate) fn timestamp_anchor(cursor: Option<Cursor>) -> Option<(DateTime<Utc>, Uuid)> {
    let cursor = cursor?;
    match cursor.sort_key_timestamp() {
        Some(ts) => Some((ts, cursor.id)),
        None => {
            warn!("cursor timestamp out of range, restarting from first page");
            None
        }
    }
}

/// Cursor anchor for a count-ordered listing.
pub(crate) fn count_anchor(cursor: Option<Cursor>) -> Option<(i64, Uuid)> {
    cursor.map(|c| (c.sort_key, c.id))
}

pub(crate) fn parse_units(raw: Option<&str>) -> Result<UnitSystem> {
    match raw {
        None => Ok(UnitSystem::default()),
        Some(value) => value
            .parse::<UnitSystem>()
            .map_err(AppError::InvalidFilterParameter),
    }
}

/// `200 OK` with a per-endpoint freshness directive.
pub(crate) fn cached_json<T: Serialize>(max_age_secs: u32, body: &T) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(CacheControl(vec![
            CacheDirective::Public,
            CacheDirective::MaxAge(max_age_secs),
        ]))
        .json(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_decode_accepts_valid_cursor() {
        let cursor = Cursor::new(42, Uuid::new_v4());
        let decoded = decode_cursor_lenient(Some(&cursor.encode()));
        assert_eq!(decoded, Some(cursor));
    }

    #[test]
    fn test_lenient_decode_discards_garbage() {
        assert_eq!(decode_cursor_lenient(Some("@@stale@@")), None);
        assert_eq!(decode_cursor_lenient(None), None);
    }

    #[test]
    fn test_units_default_and_rejection() {
        assert_eq!(parse_units(None).unwrap(), UnitSystem::Metric);
        assert_eq!(parse_units(Some("imperial")).unwrap(), UnitSystem::Imperial);
        assert!(matches!(
            parse_units(Some("cubits")),
            Err(AppError::InvalidFilterParameter(_))
        ));
    }

    #[test]
    fn test_timestamp_anchor_rejects_out_of_range() {
        let cursor = Cursor::new(i64::MAX, Uuid::new_v4());
        assert_eq!(timestamp_anchor(Some(cursor)), None);
    }
}
