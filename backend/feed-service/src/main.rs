use std::time::Duration;

use actix_web::{web, App, HttpServer};
use chrono::Utc;
use feed_service::services::{DailySampler, SharedPoller};
use feed_service::{config::Config, db, error::AppError, routes, AppState};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    let pool = db::init_pool(&config.database.url, config.database.max_connections)
        .await
        .map_err(|e| AppError::StartServer(format!("db: {e}")))?;

    // Run embedded migrations (idempotent)
    db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::StartServer(format!("database migrations failed: {e}")))?;

    let sampler = DailySampler::new(&config.sample);
    let state = AppState {
        db: pool.clone(),
        config: config.clone(),
        sampler,
    };

    // One shared background task refreshes the online-count gauge for the
    // whole process; the guard held here keeps it subscribed for the
    // server's lifetime.
    let gauge_pool = pool.clone();
    let cutoff_minutes = config.presence.default_cutoff_minutes;
    let poller = SharedPoller::new(
        Duration::from_secs(config.presence.poll_interval_secs),
        move || {
            let pool = gauge_pool.clone();
            Box::pin(async move {
                let cutoff = Utc::now() - chrono::Duration::minutes(cutoff_minutes);
                match feed_service::db::UserRepository::count_online(&pool, cutoff).await {
                    Ok(count) => tracing::debug!(online = count, "presence gauge refreshed"),
                    Err(e) => tracing::warn!(error = %e, "presence gauge refresh failed"),
                }
            })
        },
    );
    let _poller_guard = poller.subscribe();

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(%bind_addr, "starting feed-service");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure_routes)
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(actix_cors::Cors::permissive())
    })
    .bind(&bind_addr)
    .map_err(|e| AppError::StartServer(e.to_string()))?
    .run()
    .await
    .map_err(|e| AppError::StartServer(e.to_string()))?;

    Ok(())
}
