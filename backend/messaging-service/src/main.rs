use actix_web::{web, App, HttpServer};
use messaging_service::{config::Config, db, error::AppError, routes, AppState};
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

    let state = AppState {
        db: pool,
        config: config.clone(),
    };

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(%bind_addr, "starting messaging-service");

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
