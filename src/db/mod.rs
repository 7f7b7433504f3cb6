pub mod repositories;
pub mod models;
mod error;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;

pub use error::DatabaseError;
pub use models::*;

/// Open a pool for the given database url.
pub async fn connect(
    url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<SqlitePool, DatabaseError> {
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(min_connections)
        .connect(url)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{url}: {e}")))
}

/// Apply the bundled schema migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Initialize the database connection pool and bring the schema up to date
pub async fn init_pool(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = connect(
        &config.url,
        config.max_connections.unwrap_or(10),
        config.min_connections.unwrap_or(1),
    )
    .await?;

    // Run migrations
    run_migrations(&pool).await?;
    info!(url = %config.url, "Database pool ready");

    Ok(pool)
}
