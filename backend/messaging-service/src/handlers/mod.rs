use pagination::Cursor;
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

pub mod conversations;
pub mod health;
pub mod messages;

pub use conversations::{
    get_or_create_conversation, list_conversations, mark_read, unread_count,
};
pub use health::health_check;
pub use messages::{list_messages, send_message};

/// Decode a client-supplied cursor token; a stale or corrupted token means
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
