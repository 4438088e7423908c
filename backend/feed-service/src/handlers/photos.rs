use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use pagination::{resolve_tiers, Page, PageParams};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::db::{PhotoRepository, UserRepository};
use crate::error::Result;
use crate::middleware::Viewer;
use crate::models::{ListResponse, PhotoOwner, PhotoRow, PhotoView, RankedPhotoRow};
use crate::AppState;

use super::{cached_json, count_anchor, decode_cursor_lenient, timestamp_anchor};

const MIN_LIMIT: i64 = 1;
const MAX_LIMIT: i64 = 60;
const FEED_MAX_AGE_SECS: u32 = 60;

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct PhotoListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub cursor: Option<String>,
}

/// GET /api/v1/photos/new
///
/// Photos by recency, keyset-paginated.
pub async fn get_new_photos(
    query: web::Query<PhotoListParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let params = PageParams::clamped(
        query.limit,
        MIN_LIMIT,
        MAX_LIMIT,
        decode_cursor_lenient(query.cursor.as_deref()),
    );
    debug!(limit = params.limit, first_page = params.is_first_page(), "new photos request");

    let rows = PhotoRepository::list_new(
        &state.db,
        params.limit,
        timestamp_anchor(params.cursor),
    )
    .await?;
    let page = Page::from_rows(rows, params.limit);
    let page = assemble_photo_views(&state, page).await?;

    Ok(cached_json(FEED_MAX_AGE_SECS, &ListResponse::from_page(page)))
}

/// GET /api/v1/photos/hot-today
///
/// Photos ranked by likes received today. An under-filled first page widens
/// through the last week and then all time; a widened page ends pagination.
pub async fn get_hot_today(
    query: web::Query<PhotoListParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let params = PageParams::clamped(
        query.limit,
        MIN_LIMIT,
        MAX_LIMIT,
        decode_cursor_lenient(query.cursor.as_deref()),
    );
    let now = Utc::now();
    let day_start = state.sampler.day_start(now);
    let week_start = day_start - Duration::days(7);

    let page = if params.cursor.is_some() {
        // A paginating client stays on the tier it started with.
        let rows = PhotoRepository::list_hot(
            &state.db,
            Some(day_start),
            params.limit,
            count_anchor(params.cursor),
        )
        .await?;
        Page::from_rows(rows, params.limit)
    } else {
        let db = &state.db;
        let outcome = resolve_tiers(3, params.limit, |tier| {
            let window_start = match tier {
                0 => Some(day_start),
                1 => Some(week_start),
                _ => None,
            };
            PhotoRepository::list_hot(db, window_start, params.limit, None)
        })
        .await?;

        if outcome.widened {
            debug!(rows = outcome.rows.len(), "hot-today page widened past the daily tier");
            Page::without_cursor(outcome.rows)
        } else {
            Page::from_rows(outcome.rows, params.limit)
        }
    };

    let page = assemble_ranked_photo_views(&state, page).await?;
    Ok(cached_json(FEED_MAX_AGE_SECS, &ListResponse::from_page(page)))
}

/// POST /api/v1/photos/{id}/like
pub async fn like_photo(
    path: web::Path<Uuid>,
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    PhotoRepository::like(&state.db, path.into_inner(), viewer.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}

/// DELETE /api/v1/photos/{id}/like
pub async fn unlike_photo(
    path: web::Path<Uuid>,
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    PhotoRepository::unlike(&state.db, path.into_inner(), viewer.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}

/// POST /api/v1/photos/{id}/profile
///
/// Switch the viewer's profile photo; exactly one photo per owner carries
/// the flag.
pub async fn set_profile_photo(
    path: web::Path<Uuid>,
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    PhotoRepository::set_profile_photo(&state.db, viewer.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}

/// Fan out the owner-profile and like-count reads for a page of photos.
/// The two reads are independent and run concurrently; both complete
/// before the response is assembled.
async fn assemble_photo_views(
    state: &AppState,
    page: Page<PhotoRow>,
) -> Result<Page<PhotoView>> {
    let owner_ids: Vec<Uuid> = page.items.iter().map(|p| p.owner_id).collect();
    let photo_ids: Vec<Uuid> = page.items.iter().map(|p| p.id).collect();

    let (owners, counts) = futures::try_join!(
        UserRepository::profiles_by_ids(&state.db, &owner_ids),
        PhotoRepository::like_counts(&state.db, &photo_ids),
    )?;

    let owners: HashMap<Uuid, PhotoOwner> = owners
        .into_iter()
        .map(|u| {
            (
                u.id,
                PhotoOwner {
                    id: u.id,
                    username: u.username,
                    avatar_url: u.avatar_url,
                },
            )
        })
        .collect();
    let counts: HashMap<Uuid, i64> = counts.into_iter().collect();

    Ok(page.map(|p| PhotoView {
        id: p.id,
        owner: owners.get(&p.owner_id).cloned(),
        caption: p.caption,
        thumbnail_url: p.thumbnail_url,
        like_count: counts.get(&p.id).copied().unwrap_or(0),
        created_at: p.created_at,
    }))
}

/// Ranked rows already carry their window like count; only the owner
/// profiles need fetching.
async fn assemble_ranked_photo_views(
    state: &AppState,
    page: Page<RankedPhotoRow>,
) -> Result<Page<PhotoView>> {
    let owner_ids: Vec<Uuid> = page.items.iter().map(|p| p.owner_id).collect();
    let owners = UserRepository::profiles_by_ids(&state.db, &owner_ids).await?;
    let owners: HashMap<Uuid, PhotoOwner> = owners
        .into_iter()
        .map(|u| {
            (
                u.id,
                PhotoOwner {
                    id: u.id,
                    username: u.username,
                    avatar_url: u.avatar_url,
                },
            )
        })
        .collect();

    Ok(page.map(|p| PhotoView {
        id: p.id,
        owner: owners.get(&p.owner_id).cloned(),
        caption: p.caption,
        thumbnail_url: p.thumbnail_url,
        like_count: p.like_count,
        created_at: p.created_at,
    }))
}
