//! Persistence for library panels and their dashboard connections.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod repositories;
pub mod service;
pub mod tx;

pub use config::DbConfig;
pub use context::RequestContext;
pub use error::{RepoError, RepoResult};
pub use service::LibraryPanelService;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL with default settings.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    create_pool_with_config(&DbConfig::new(database_url)).await
}

/// Create a connection pool using the given configuration.
pub async fn create_pool_with_config(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
