use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use pagination::{resolve_tiers, Page, PageParams};
use serde::Deserialize;
use tracing::debug;

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::Viewer;
use crate::models::{ListResponse, RankedUserView, UserView};
use crate::AppState;

use super::{cached_json, count_anchor, decode_cursor_lenient, parse_units, timestamp_anchor};

const MIN_LIMIT: i64 = 1;
const MAX_LIMIT: i64 = 60;
const MIN_CUTOFF_MINUTES: i64 = 1;
const MAX_CUTOFF_MINUTES: i64 = 240;

const ONLINE_MAX_AGE_SECS: u32 = 15;
const NEW_USERS_MAX_AGE_SECS: u32 = 300;
const DAILY_TOP_MAX_AGE_SECS: u32 = 300;

fn default_limit() -> i64 {
    20
}

fn default_include_self() -> bool {
    false
}

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub cursor: Option<String>,
    pub unit_system: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OnlineListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub cursor: Option<String>,
    pub unit_system: Option<String>,
    pub cutoff_minutes: Option<i64>,
    #[serde(default = "default_include_self")]
    pub include_self: bool,
}

/// GET /api/v1/users/online
///
/// Users active within the cutoff window, most recently active first.
pub async fn get_online_users(
    query: web::Query<OnlineListParams>,
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let units = parse_units(query.unit_system.as_deref())?;
    let params = PageParams::clamped(
        query.limit,
        MIN_LIMIT,
        MAX_LIMIT,
        decode_cursor_lenient(query.cursor.as_deref()),
    );
    let cutoff_minutes = query
        .cutoff_minutes
        .unwrap_or(state.config.presence.default_cutoff_minutes)
        .clamp(MIN_CUTOFF_MINUTES, MAX_CUTOFF_MINUTES);
    let cutoff = Utc::now() - Duration::minutes(cutoff_minutes);
    let exclude = if query.include_self { None } else { Some(viewer.0) };

    debug!(
        limit = params.limit,
        cutoff_minutes,
        include_self = query.include_self,
        "online users request"
    );

    let rows = UserRepository::list_online(
        &state.db,
        cutoff,
        exclude,
        params.limit,
        timestamp_anchor(params.cursor),
    )
    .await?;
    let page = Page::from_rows_by(rows, params.limit, |u| {
        (u.last_active_at.timestamp_micros(), u.id)
    });

    let page = page.map(|u| UserView::render(u, units));
    Ok(cached_json(ONLINE_MAX_AGE_SECS, &ListResponse::from_page(page)))
}

/// GET /api/v1/users/new
///
/// Recently registered users. The first page widens 7 days -> 30 days ->
/// all time when the narrow window runs dry.
pub async fn get_new_users(
    query: web::Query<UserListParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let units = parse_units(query.unit_system.as_deref())?;
    let params = PageParams::clamped(
        query.limit,
        MIN_LIMIT,
        MAX_LIMIT,
        decode_cursor_lenient(query.cursor.as_deref()),
    );
    let now = Utc::now();

    let page = if params.cursor.is_some() {
        let rows = UserRepository::list_new(
            &state.db,
            Some(now - Duration::days(7)),
            params.limit,
            timestamp_anchor(params.cursor),
        )
        .await?;
        Page::from_rows(rows, params.limit)
    } else {
        let db = &state.db;
        let outcome = resolve_tiers(3, params.limit, |tier| {
            let window_start = match tier {
                0 => Some(now - Duration::days(7)),
                1 => Some(now - Duration::days(30)),
                _ => None,
            };
            UserRepository::list_new(db, window_start, params.limit, None)
        })
        .await?;

        if outcome.widened {
            debug!(rows = outcome.rows.len(), "new-users page widened past the weekly tier");
            Page::without_cursor(outcome.rows)
        } else {
            Page::from_rows(outcome.rows, params.limit)
        }
    };

    let page = page.map(|u| UserView::render(u, units));
    Ok(cached_json(NEW_USERS_MAX_AGE_SECS, &ListResponse::from_page(page)))
}

/// GET /api/v1/users/daily-top
///
/// Users ranked by likes received today, widening to the week and then all
/// time on an under-filled first page.
pub async fn get_daily_top(
    query: web::Query<UserListParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let units = parse_units(query.unit_system.as_deref())?;
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
        let rows = UserRepository::list_daily_top(
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
            UserRepository::list_daily_top(db, window_start, params.limit, None)
        })
        .await?;

        if outcome.widened {
            Page::without_cursor(outcome.rows)
        } else {
            Page::from_rows(outcome.rows, params.limit)
        }
    };

    let page = page.map(|u| RankedUserView::render(u, units));
    Ok(cached_json(DAILY_TOP_MAX_AGE_SECS, &ListResponse::from_page(page)))
}

/// GET /api/v1/users/daily-sample
///
/// Today's deterministic sample: the same pseudo-random subset for every
/// caller until the reference-day boundary, cacheable exactly that long.
pub async fn get_daily_sample(
    query: web::Query<UserListParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let units = parse_units(query.unit_system.as_deref())?;
    let limit = query.limit.clamp(MIN_LIMIT, MAX_LIMIT);
    let now = Utc::now();
    let pivot = state.sampler.pivot_for(now);

    debug!(%pivot, "daily sample request");

    let rows = UserRepository::sample_ring(&state.db, pivot, limit).await?;
    let page = Page::without_cursor(rows).map(|u| UserView::render(u, units));

    Ok(cached_json(
        state.sampler.seconds_until_rollover(now),
        &ListResponse::from_page(page),
    ))
}
