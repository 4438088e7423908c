use chrono::{DateTime, Utc};
use pagination::SortKeyed;
use serde::Serialize;
use uuid::Uuid;

pub mod pair;

pub use pair::{ConversationKey, PairError, Slot};

// ============================================
// Row types
// ============================================

/// A stored conversation. `activity_at` is computed in the SELECT as
/// `COALESCE(last_message_at, created_at)` and is the listing sort key, so
/// empty conversations still have a stable position.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConversationRow {
    pub id: Uuid,
    pub user_low: Uuid,
    pub user_high: Uuid,
    pub last_message_at: Option<DateTime<Utc>>,
    pub low_read_at: Option<DateTime<Utc>>,
    pub high_read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub activity_at: DateTime<Utc>,
}

impl ConversationRow {
    pub fn slot_of(&self, user: Uuid) -> Option<Slot> {
        if user == self.user_low {
            Some(Slot::Low)
        } else if user == self.user_high {
            Some(Slot::High)
        } else {
            None
        }
    }

    pub fn watermark(&self, slot: Slot) -> Option<DateTime<Utc>> {
        match slot {
            Slot::Low => self.low_read_at,
            Slot::High => self.high_read_at,
        }
    }

    pub fn peer_of(&self, viewer: Uuid) -> Option<Uuid> {
        match self.slot_of(viewer)? {
            Slot::Low => Some(self.user_high),
            Slot::High => Some(self.user_low),
        }
    }

    /// The unread predicate for one participant: something was said, and
    /// this participant's watermark is missing or strictly older than it.
    /// A watermark equal to `last_message_at` means fully read.
    pub fn unread_for(&self, viewer: Uuid) -> bool {
        if self.user_low == self.user_high {
            // Degenerate rows cannot exist under the store CHECK, but the
            // predicate excludes them regardless.
            return false;
        }
        let Some(slot) = self.slot_of(viewer) else {
            return false;
        };
        let Some(last_message_at) = self.last_message_at else {
            return false;
        };
        match self.watermark(slot) {
            None => true,
            Some(watermark) => watermark < last_message_at,
        }
    }
}

impl SortKeyed for ConversationRow {
    fn sort_key(&self) -> i64 {
        self.activity_at.timestamp_micros()
    }
    fn row_id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl SortKeyed for MessageRow {
    fn sort_key(&self) -> i64 {
        self.created_at.timestamp_micros()
    }
    fn row_id(&self) -> Uuid {
        self.id
    }
}

// ============================================
// View models
// ============================================

#[derive(Debug, Clone, Serialize)]
pub struct ConversationView {
    pub id: Uuid,
    pub peer_id: Option<Uuid>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread: bool,
    pub created_at: DateTime<Utc>,
}

impl ConversationView {
    pub fn render(row: ConversationRow, viewer: Uuid) -> Self {
        Self {
            peer_id: row.peer_of(viewer),
            unread: row.unread_for(viewer),
            id: row.id,
            last_message_at: row.last_message_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for MessageView {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            sender_id: row.sender_id,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

// ============================================
// Response envelopes
// ============================================

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub ok: bool,
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> ListResponse<T> {
    pub fn from_page(page: pagination::Page<T>) -> Self {
        Self {
            ok: true,
            items: page.items,
            next_cursor: page.next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn conversation(
        last_message_at: Option<DateTime<Utc>>,
        low_read_at: Option<DateTime<Utc>>,
        high_read_at: Option<DateTime<Utc>>,
    ) -> ConversationRow {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ConversationRow {
            id: Uuid::from_u128(10),
            user_low: Uuid::from_u128(1),
            user_high: Uuid::from_u128(2),
            last_message_at,
            low_read_at,
            high_read_at,
            created_at,
            activity_at: last_message_at.unwrap_or(created_at),
        }
    }

    #[test]
    fn test_unread_truth_table() {
        let low = Uuid::from_u128(1);
        let t1 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();

        // No message yet: nothing to read.
        assert!(!conversation(None, None, None).unread_for(low));
        // Messages but no watermark: unread.
        assert!(conversation(Some(t2), None, None).unread_for(low));
        // Watermark older than the last message: unread.
        assert!(conversation(Some(t2), Some(t1), None).unread_for(low));
        // Watermark at the last message: read.
        assert!(!conversation(Some(t2), Some(t2), None).unread_for(low));
    }

    #[test]
    fn test_unread_is_per_slot() {
        let t2 = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        let row = conversation(Some(t2), Some(t2), None);
        assert!(!row.unread_for(Uuid::from_u128(1)));
        assert!(row.unread_for(Uuid::from_u128(2)));
    }

    #[test]
    fn test_non_participant_is_never_unread() {
        let t2 = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        assert!(!conversation(Some(t2), None, None).unread_for(Uuid::from_u128(99)));
    }

    #[test]
    fn test_peer_resolution() {
        let row = conversation(None, None, None);
        assert_eq!(row.peer_of(Uuid::from_u128(1)), Some(Uuid::from_u128(2)));
        assert_eq!(row.peer_of(Uuid::from_u128(2)), Some(Uuid::from_u128(1)));
        assert_eq!(row.peer_of(Uuid::from_u128(3)), None);
    }
}
