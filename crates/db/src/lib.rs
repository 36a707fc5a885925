//! PostgreSQL persistence for the document labelling platform.
//!
//! - [`models`] -- row structs and DTOs.
//! - [`repositories`] -- zero-sized repos with async CRUD over `&PgPool`.
//! - [`store`] -- the transactional unit of work used for annotation writes.
//! - `state_tracker` -- keeps `documents.is_annotated` in step with the spans.
//! - [`writer`] -- validate-then-persist orchestration with bounded retry.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
mod state_tracker;
pub mod store;
pub mod writer;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
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
