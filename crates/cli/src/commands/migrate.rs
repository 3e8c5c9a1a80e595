//! Database migration command.
//!
//! Migrations live in `crates/api/migrations/` and are embedded at compile
//! time. They are never applied by the API server itself.
//!
//! ```text
//! migrations/
//! ├── 20260101000001_create_users.sql
//! ├── 20260101000002_create_products.sql
//! ├── 20260101000003_create_cart.sql
//! └── 20260101000004_create_orders.sql
//! ```

use ecommerce_api::db;
use thiserror::Error;

use super::{CommandError, database_url};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url, 1).await?;

    let migrator = sqlx::migrate!("../api/migrations");
    tracing::info!(count = migrator.iter().count(), "Running migrations...");
    migrator.run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
