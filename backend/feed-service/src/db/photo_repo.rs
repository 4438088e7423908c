//! Photo listings and like mutations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{PhotoRow, RankedPhotoRow};

pub struct PhotoRepository;

impl PhotoRepository {
    /// Photos by `(created_at, id)` descending, optionally continuing below
    /// a cursor.
    pub async fn list_new(
        pool: &PgPool,
        limit: i64,
        after: Option<(DateTime<Utc>, Uuid)>,
    ) -> Result<Vec<PhotoRow>> {
        let rows = if let Some((ts, id)) = after {
            sqlx::query_as::<_, PhotoRow>(
                r#"
                SELECT id, owner_id, caption, thumbnail_url, created_at
                FROM photos
                WHERE created_at < $1 OR (created_at = $1 AND id < $2)
                ORDER BY created_at DESC, id DESC
                LIMIT $3
                "#,
            )
            .bind(ts)
            .bind(id)
            .bind(limit)
            .fetch_all(pool)
            .await
        } else {
            sqlx::query_as::<_, PhotoRow>(
                r#"
                SELECT id, owner_id, caption, thumbnail_url, created_at
                FROM photos
                ORDER BY created_at DESC, id DESC
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(pool)
            .await
        }
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// Photos ranked by likes received since `window_start` (all-time when
    /// `None`), ordered `(like_count, id)` descending. Only photos with at
    /// least one like in the window qualify.
    pub async fn list_hot(
        pool: &PgPool,
        window_start: Option<DateTime<Utc>>,
        limit: i64,
        after: Option<(i64, Uuid)>,
    ) -> Result<Vec<RankedPhotoRow>> {
        let rows = if let Some((count, id)) = after {
            sqlx::query_as::<_, RankedPhotoRow>(
                r#"
                SELECT p.id, p.owner_id, p.caption, p.thumbnail_url, p.created_at,
                       COUNT(*) AS like_count
                FROM photos p
                JOIN photo_likes l ON l.photo_id = p.id
                WHERE ($1::timestamptz IS NULL OR l.created_at >= $1)
                GROUP BY p.id
                HAVING COUNT(*) < $2 OR (COUNT(*) = $2 AND p.id < $3)
                ORDER BY like_count DESC, p.id DESC
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
            sqlx::query_as::<_, RankedPhotoRow>(
                r#"
                SELECT p.id, p.owner_id, p.caption, p.thumbnail_url, p.created_at,
                       COUNT(*) AS like_count
                FROM photos p
                JOIN photo_likes l ON l.photo_id = p.id
                WHERE ($1::timestamptz IS NULL OR l.created_at >= $1)
                GROUP BY p.id
                ORDER BY like_count DESC, p.id DESC
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

    /// Like counts for a batch of photos (fan-out read for feed assembly).
    pub async fn like_counts(pool: &PgPool, photo_ids: &[Uuid]) -> Result<Vec<(Uuid, i64)>> {
        if photo_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT photo_id, COUNT(*)
            FROM photo_likes
            WHERE photo_id = ANY($1)
            GROUP BY photo_id
            "#,
        )
        .bind(photo_ids)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// Idempotent like.
    pub async fn like(pool: &PgPool, photo_id: Uuid, liker_id: Uuid) -> Result<()> {
        Self::ensure_exists(pool, photo_id).await?;

        sqlx::query(
            "INSERT INTO photo_likes (photo_id, liker_id, created_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (photo_id, liker_id) DO NOTHING",
        )
        .bind(photo_id)
        .bind(liker_id)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }

    /// Idempotent unlike.
    pub async fn unlike(pool: &PgPool, photo_id: Uuid, liker_id: Uuid) -> Result<()> {
        Self::ensure_exists(pool, photo_id).await?;

        sqlx::query("DELETE FROM photo_likes WHERE photo_id = $1 AND liker_id = $2")
            .bind(photo_id)
            .bind(liker_id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }

    /// Make `photo_id` the owner's single profile photo. The clear and the
    /// set commit together, so there is never a moment with zero or two
    /// flagged rows.
    pub async fn set_profile_photo(pool: &PgPool, owner_id: Uuid, photo_id: Uuid) -> Result<()> {
        let mut tx = pool.begin().await.map_err(AppError::Database)?;

        let owned: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM photos WHERE id = $1 AND owner_id = $2")
                .bind(photo_id)
                .bind(owner_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?;

        if owned.is_none() {
            return Err(AppError::NotFound(format!(
                "photo {photo_id} not found for owner"
            )));
        }

        sqlx::query("UPDATE photos SET is_profile = FALSE WHERE owner_id = $1 AND is_profile")
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("UPDATE photos SET is_profile = TRUE WHERE id = $1")
            .bind(photo_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn ensure_exists(pool: &PgPool, photo_id: Uuid) -> Result<()> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM photos WHERE id = $1)")
                .bind(photo_id)
                .fetch_one(pool)
                .await
                .map_err(AppError::Database)?;

        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("photo {photo_id} not found")))
        }
    }
}
