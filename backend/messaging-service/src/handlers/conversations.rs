use actix_web::{web, HttpResponse};
use pagination::{Page, PageParams};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::db::ConversationRepository;
use crate::error::Result;
use crate::middleware::Viewer;
use crate::models::{ConversationKey, ConversationView, ListResponse};
use crate::AppState;

use super::{decode_cursor_lenient, timestamp_anchor};

const MIN_LIMIT: i64 = 1;
const MAX_LIMIT: i64 = 60;

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct ConversationListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub cursor: Option<String>,
}

/// PUT /api/v1/conversations/{peer_id}
///
/// Resolve (or create) the canonical conversation between the viewer and a
/// peer. `(a, b)` and `(b, a)` land on the same row.
pub async fn get_or_create_conversation(
    path: web::Path<Uuid>,
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let key = ConversationKey::new(viewer.0, path.into_inner())?;
    let row = ConversationRepository::get_or_create(&state.db, &key).await?;
    Ok(HttpResponse::Ok().json(ConversationView::render(row, viewer.0)))
}

/// GET /api/v1/conversations
///
/// The viewer's conversations, most recently active first, with the
/// viewer-slot unread flag on each item.
pub async fn list_conversations(
    query: web::Query<ConversationListParams>,
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let params = PageParams::clamped(
        query.limit,
        MIN_LIMIT,
        MAX_LIMIT,
        decode_cursor_lenient(query.cursor.as_deref()),
    );
    debug!(viewer = %viewer.0, limit = params.limit, "conversation list request");

    let rows = ConversationRepository::list_for(
        &state.db,
        viewer.0,
        params.limit,
        timestamp_anchor(params.cursor),
    )
    .await?;
    let page = Page::from_rows(rows, params.limit).map(|row| ConversationView::render(row, viewer.0));

    Ok(HttpResponse::Ok().json(ListResponse::from_page(page)))
}

/// GET /api/v1/conversations/unread-count
pub async fn unread_count(viewer: Viewer, state: web::Data<AppState>) -> Result<HttpResponse> {
    let count = ConversationRepository::unread_count(&state.db, viewer.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "ok": true,
        "unread_count": count
    })))
}

/// POST /api/v1/conversations/{id}/read
///
/// Advance the viewer's watermark to the conversation's current
/// `last_message_at`.
pub async fn mark_read(
    path: web::Path<Uuid>,
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    ConversationRepository::mark_read(&state.db, path.into_inner(), viewer.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}
