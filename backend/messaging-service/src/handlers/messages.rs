use actix_web::{web, HttpResponse};
use pagination::{Page, PageParams};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::ConversationRepository;
use crate::error::{AppError, Result};
use crate::middleware::Viewer;
use crate::models::{ConversationKey, ListResponse, MessageView};
use crate::AppState;

use super::{decode_cursor_lenient, timestamp_anchor};

const MIN_LIMIT: i64 = 1;
const MAX_LIMIT: i64 = 200;
const MAX_BODY_CHARS: usize = 4000;

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct MessageListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

/// POST /api/v1/conversations/{peer_id}/messages
///
/// First message to a peer creates the conversation; the insert and the
/// `last_message_at` advance commit together.
pub async fn send_message(
    path: web::Path<Uuid>,
    request: web::Json<SendMessageRequest>,
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let body = request.into_inner().body;
    if body.trim().is_empty() {
        return Err(AppError::BadRequest("message body is empty".to_string()));
    }
    if body.chars().count() > MAX_BODY_CHARS {
        return Err(AppError::BadRequest(format!(
            "message body exceeds {MAX_BODY_CHARS} characters"
        )));
    }

    let key = ConversationKey::new(viewer.0, path.into_inner())?;
    let conversation = ConversationRepository::get_or_create(&state.db, &key).await?;
    let message =
        ConversationRepository::send_message(&state.db, conversation.id, viewer.0, body).await?;

    Ok(HttpResponse::Ok().json(MessageView::from(message)))
}

/// GET /api/v1/conversations/{peer_id}/messages
///
/// Message history with the peer, newest first, keyset-paginated.
pub async fn list_messages(
    path: web::Path<Uuid>,
    query: web::Query<MessageListParams>,
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let key = ConversationKey::new(viewer.0, path.into_inner())?;
    let params = PageParams::clamped(
        query.limit,
        MIN_LIMIT,
        MAX_LIMIT,
        decode_cursor_lenient(query.cursor.as_deref()),
    );

    let conversation = ConversationRepository::get_for_participants(&state.db, &key)
        .await?
        .ok_or_else(|| AppError::NotFound("conversation not found".to_string()))?;

    let rows = ConversationRepository::list_messages(
        &state.db,
        conversation.id,
        params.limit,
        timestamp_anchor(params.cursor),
    )
    .await?;
    let page = Page::from_rows(rows, params.limit).map(MessageView::from);

    Ok(HttpResponse::Ok().json(ListResponse::from_page(page)))
}
