//! Route configuration

use actix_web::web;

use crate::handlers;

/// Configure all routes for the application
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health_check))
            .service(
                // Literal segments registered ahead of the parameterized
                // ones so "unread-count" never matches as a peer id.
                web::scope("/conversations")
                    .route("", web::get().to(handlers::list_conversations))
                    .route("/unread-count", web::get().to(handlers::unread_count))
                    .route("/{id}/read", web::post().to(handlers::mark_read))
                    .route("/{peer_id}/messages", web::post().to(handlers::send_message))
                    .route("/{peer_id}/messages", web::get().to(handlers::list_messages))
                    .route("/{peer_id}", web::put().to(handlers::get_or_create_conversation)),
            ),
    );
}
