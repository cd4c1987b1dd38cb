use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

pub mod articles;
pub mod models;
pub mod taxonomy;
pub mod users;

pub use articles::ArticleStore;
pub use models::{Article, ArticleFields, TaxonomyEntry, TaxonomyKind, User};
pub use taxonomy::TaxonomyStore;
pub use users::UserStore;

/// Errors from the content store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Open the content store described by the configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, StoreError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!("Opened content store at {}", config.url);
    Ok(pool)
}

/// Statements that bring an empty store up to the expected collection layout.
/// Each collection is owned by exactly one repository; the articles FTS index
/// is maintained by the article repository on every write.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        layout TEXT NOT NULL,
        page_count INTEGER NOT NULL,
        description TEXT NOT NULL,
        editor TEXT NOT NULL,
        month TEXT NOT NULL,
        year TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE VIRTUAL TABLE IF NOT EXISTS articles_fts
        USING fts5(id UNINDEXED, title, author, description)",
    "CREATE TABLE IF NOT EXISTS editors (id TEXT PRIMARY KEY, value TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS authors (id TEXT PRIMARY KEY, value TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS months (id TEXT PRIMARY KEY, value TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS years (id TEXT PRIMARY KEY, value TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS sections (id TEXT PRIMARY KEY, value TEXT NOT NULL)",
];

/// Create any missing collections. Idempotent, runs at startup.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Pings the store to ensure connectivity
pub async fn health_check(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory store");
    init_schema(&pool).await.expect("schema");
    pool
}
