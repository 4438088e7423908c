use actix_web::{web, HttpResponse};

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::Viewer;
use crate::AppState;

/// POST /api/v1/presence/heartbeat
///
/// Clients poll this while the app is open; it advances the viewer's
/// `last_active_at`, which drives the online listing.
pub async fn heartbeat(viewer: Viewer, state: web::Data<AppState>) -> Result<HttpResponse> {
    UserRepository::touch_last_active(&state.db, viewer.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}
