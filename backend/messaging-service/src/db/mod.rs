use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Pool, Postgres};

pub mod conversation_repo;

pub use conversation_repo::ConversationRepository;

// Embed SQL migrations at compile time for deterministic startup
const MIG_0001: &str = include_str!("../../migrations/0001_create_conversations.sql");
const MIG_0002: &str = include_str!("../../migrations/0002_create_messages.sql");

pub async fn init_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
}

/// Run embedded migrations (idempotent).
pub async fn run_migrations(db: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    for (i, sql) in [MIG_0001, MIG_0002].into_iter().enumerate() {
        sqlx::query(sql).execute(db).await?;
        tracing::info!(migration = i + 1, "messaging-service migration applied");
    }
    Ok(())
}
