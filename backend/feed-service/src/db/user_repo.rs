//! User listings: presence, registration recency, daily rankings, and the
//! deterministic daily sample.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{RankedUserRow, UserRow};

const USER_COLUMNS: &str =
    "id, username, avatar_url, height_cm, weight_kg, created_at, last_active_at";

pub struct UserRepository;

impl UserRepository {
    /// Users active since `cutoff`, ordered `(last_active_at, id)`
    /// descending. `exclude` drops the viewer's own row when
    /// `include_self=false`.
    pub async fn list_online(
        pool: &PgPool,
        cutoff: DateTime<Utc>,
        exclude: Option<Uuid>,
        limit: i64,
        after: Option<(DateTime<Utc>, Uuid)>,
    ) -> Result<Vec<UserRow>> {
        let sql_with_cursor = format!(
            "SELECT {USER_COLUMNS}
             FROM users
             WHERE last_active_at >= $1
               AND ($2::uuid IS NULL OR id <> $2)
               AND (last_active_at < $3 OR (last_active_at = $3 AND id < $4))
             ORDER BY last_active_at DESC, id DESC
             LIMIT $5"
        );
        let sql_first_page = format!(
            "SELECT {USER_COLUMNS}
             FROM users
             WHERE last_active_at >= $1
               AND ($2::uuid IS NULL OR id <> $2)
             ORDER BY last_active_at DESC, id DESC
             LIMIT $3"
        );

        let rows = if let Some((ts, id)) = after {
            sqlx::query_as::<_, UserRow>(&sql_with_cursor)
                .bind(cutoff)
                .bind(exclude)
                .bind(ts)
                .bind(id)
                .bind(limit)
                .fetch_all(pool)
                .await
        } else {
            sqlx::query_as::<_, UserRow>(&sql_first_page)
                .bind(cutoff)
                .bind(exclude)
                .bind(limit)
                .fetch_all(pool)
                .await
        }
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// Users registered since `window_start` (all users when `None`),
    /// ordered `(created_at, id)` descending.
    pub async fn list_new(
        pool: &PgPool,
        window_start: Option<DateTime<Utc>>,
        limit: i64,
        after: Option<(DateTime<Utc>, Uuid)>,
    ) -> Result<Vec<UserRow>> {
        let sql_with_cursor = format!(
            "SELECT {USER_COLUMNS}
             FROM users
             WHERE ($1::timestamptz IS NULL OR created_at >= $1)
               AND (created_at < $2 OR (created_at = $2 AND id < $3))
             ORDER BY created_at DESC, id DESC
             LIMIT $4"
        );
        let sql_first_page = format!(
            "SELECT {USER_COLUMNS}
             FROM users
             WHERE ($1::timestamptz IS NULL OR created_at >= $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );

        let rows = if let Some((ts, id)) = after {
            sqlx::query_as::<_, UserRow>(&sql_with_cursor)
                .bind(window_start)
                .bind(ts)
                .bind(id)
                .bind(limit)
                .fetch_all(pool)
                .await
        } else {
            sqlx::query_as::<_, UserRow>(&sql_first_page)
                .bind(window_start)
                .bind(limit)
                .fetch_all(pool)
                .await
        }
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// Users ranked by likes their photos received since `window_start`
    /// (all-time when `None`), ordered `(like_count, id)` descending.
    pub async fn list_daily_top(
        pool: &PgPool,
        window_start: Option<DateTime<Utc>>,
        limit: i64,
        after: Option<(i64, Uuid)>,
    ) -> Result<Vec<RankedUserRow>> {
        let rows = if let Some((count, id)) = after {
            sqlx::query_as::<_, RankedUserRow>(
                r#"
                SELECT u.id, u.username, u.avatar_url, u.height_cm, u.weight_kg,
                       u.created_at, u.last_active_at, COUNT(*) AS like_count
                FROM users u
                JOIN photos p ON p.owner_id = u.id
                JOIN photo_likes l ON l.photo_id = p.id
                WHERE ($1::timestamptz IS NULL OR l.created_at >= $1)
                GROUP BY u.id
                HAVING COUNT(*) < $2 OR (COUNT(*) = $2 AND u.id < $3)
                ORDER BY like_count DESC, u.id DESC
                LIMIT $4
                "#,
            )
            .bind(window_start)
            .bind(count)
            .bind(id)
            .bind(limit)
            .fetch_all(pool)
            .await
        } else {
            sqlx::query_as::<_, RankedUserRow>(
                r#"
                SELECT u.id, u.username, u.avatar_url, u.height_cm, u.weight_kg,
                       u.created_at, u.last_active_at, COUNT(*) AS like_count
                FROM users u
                JOIN photos p ON p.owner_id = u.id
                JOIN photo_likes l ON l.photo_id = p.id
                WHERE ($1::timestamptz IS NULL OR l.created_at >= $1)
                GROUP BY u.id
                ORDER BY like_count DESC, u.id DESC
                LIMIT $2
                "#,
            )
            .bind(window_start)
            .bind(limit)
            .fetch_all(pool)
            .await
        }
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// The id space as a ring rotated at `pivot`: rows from the pivot up,
    /// then wrapped around from the bottom until `limit` rows are gathered.
    /// The two ranges are disjoint, so no row repeats.
    pub async fn sample_ring(pool: &PgPool, pivot: Uuid, limit: i64) -> Result<Vec<UserRow>> {
        let sql_upper = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id >= $1 ORDER BY id ASC LIMIT $2"
        );
        let mut rows = sqlx::query_as::<_, UserRow>(&sql_upper)
            .bind(pivot)
            .bind(limit)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)?;

        let remainder = limit - rows.len() as i64;
        if remainder > 0 {
            let sql_wrap = format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id < $1 ORDER BY id ASC LIMIT $2"
            );
            let wrapped = sqlx::query_as::<_, UserRow>(&sql_wrap)
                .bind(pivot)
                .bind(remainder)
                .fetch_all(pool)
                .await
                .map_err(AppError::Database)?;
            rows.extend(wrapped);
        }

        Ok(rows)
    }

    /// Display profiles for a batch of ids (fan-out read).
    pub async fn profiles_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<UserRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(ids)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// Advance the viewer's presence watermark to now.
    pub async fn touch_last_active(pool: &PgPool, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE users SET last_active_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user {user_id} not found")));
        }

        Ok(())
    }

    pub async fn count_online(pool: &PgPool, cutoff: DateTime<Utc>) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE last_active_at >= $1")
                .bind(cutoff)
                .fetch_one(pool)
                .await
                .map_err(AppError::Database)?;

        Ok(count)
    }
}
