//! # Database Persistence Layer
//!
//! Postgres persistence for decoded vehicle records via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, resolved
//! records are cached in the `vehicles` table. When absent, the service
//! falls back to [`crate::store::InMemoryVehicleStore`] and the cache does
//! not survive restarts.

pub mod vehicles;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            tracing::warn!(
                "DATABASE_URL not set, running in-memory only mode. \
                 Cached vehicles will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = connect(&url).await?;
    tracing::info!("Connected to PostgreSQL");
    Ok(Some(pool))
}

/// Connect to `url` and apply embedded migrations.
pub async fn connect(url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
