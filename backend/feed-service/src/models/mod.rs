use chrono::{DateTime, Utc};
use pagination::SortKeyed;
use serde::Serialize;
use uuid::Uuid;

pub mod units;

pub use units::UnitSystem;

// ============================================
// Row types (as stored)
// ============================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PhotoRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub caption: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Photo with the like count of the active ranking window.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RankedPhotoRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub caption: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
}

/// User with the like count their photos received in the ranking window.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RankedUserRow {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub like_count: i64,
}

// Registration recency is the canonical user ordering; the online listing
// pages by last_active_at through `Page::from_rows_by`.
impl SortKeyed for UserRow {
    fn sort_key(&self) -> i64 {
        self.created_at.timestamp_micros()
    }
    fn row_id(&self) -> Uuid {
        self.id
    }
}

impl SortKeyed for PhotoRow {
    fn sort_key(&self) -> i64 {
        self.created_at.timestamp_micros()
    }
    fn row_id(&self) -> Uuid {
        self.id
    }
}

impl SortKeyed for RankedPhotoRow {
    fn sort_key(&self) -> i64 {
        self.like_count
    }
    fn row_id(&self) -> Uuid {
        self.id
    }
}

impl SortKeyed for RankedUserRow {
    fn sort_key(&self) -> i64 {
        self.like_count
    }
    fn row_id(&self) -> Uuid {
        self.id
    }
}

// ============================================
// View models (as rendered for a viewer)
// ============================================

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    /// Rendered in the viewer's unit system, e.g. "178 cm" or "5'10\"".
    pub height: Option<String>,
    /// Rendered in the viewer's unit system, e.g. "82 kg" or "181 lb".
    pub weight: Option<String>,
    pub last_active_at: DateTime<Utc>,
}

impl UserView {
    pub fn render(row: UserRow, units: UnitSystem) -> Self {
        Self {
            id: row.id,
            username: row.username,
            avatar_url: row.avatar_url,
            height: units::format_height(row.height_cm, units),
            weight: units::format_weight(row.weight_kg, units),
            last_active_at: row.last_active_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedUserView {
    #[serde(flatten)]
    pub user: UserView,
    pub like_count: i64,
}

impl RankedUserView {
    pub fn render(row: RankedUserRow, units: UnitSystem) -> Self {
        Self {
            user: UserView::render(
                UserRow {
                    id: row.id,
                    username: row.username,
                    avatar_url: row.avatar_url,
                    height_cm: row.height_cm,
                    weight_kg: row.weight_kg,
                    created_at: row.created_at,
                    last_active_at: row.last_active_at,
                },
                units,
            ),
            like_count: row.like_count,
        }
    }
}

/// Owner details shown on a feed item; filled by the profile fan-out query.
#[derive(Debug, Clone, Serialize)]
pub struct PhotoOwner {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotoView {
    pub id: Uuid,
    pub owner: Option<PhotoOwner>,
    pub caption: Option<String>,
    pub thumbnail_url: Option<String>,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Response envelopes
// ============================================

/// Uniform listing response: `{ ok, items, next_cursor }`.
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
