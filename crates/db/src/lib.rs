//! Persistence layer: row models, DTOs and repositories over PostgreSQL.
//!
//! Each model submodule contains a `FromRow` + `Serialize` entity
//! struct matching the database row and `Deserialize` DTOs for
//! inserts. Repositories are zero-sized structs providing async
//! methods that accept `&PgPool` as the first argument.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod models;
pub mod repositories;

pub use error::DbError;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
