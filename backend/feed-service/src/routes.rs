//! Route configuration
//!
//! Each domain (photos, users, presence) manages its own routes.

use actix_web::web;

use crate::handlers;

/// Configure all routes for the application
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health_check))
            .configure(routes::photos::configure)
            .configure(routes::users::configure)
            .configure(routes::presence::configure),
    );
}

// Sub-modules for each domain
mod routes {
    use super::*;

    pub mod photos {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/photos")
                    .route("/new", web::get().to(handlers::get_new_photos))
                    .route("/hot-today", web::get().to(handlers::get_hot_today))
                    .route("/{id}/like", web::post().to(handlers::like_photo))
                    .route("/{id}/like", web::delete().to(handlers::unlike_photo))
                    .route("/{id}/profile", web::post().to(handlers::set_profile_photo)),
            );
        }
    }

    pub mod users {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/users")
                    .route("/online", web::get().to(handlers::get_online_users))
                    .route("/new", web::get().to(handlers::get_new_users))
                    .route("/daily-top", web::get().to(handlers::get_daily_top))
                    .route("/daily-sample", web::get().to(handlers::get_daily_sample)),
            );
        }
    }

    pub mod presence {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/presence")
                    .route("/heartbeat", web::post().to(handlers::heartbeat)),
            );
        }
    }
}
