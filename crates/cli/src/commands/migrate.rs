//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! gatehouse-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `GATEHOUSE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL`
//!   connection string

use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::{CommandError, database_url};

/// Run all pending migrations against the configured database.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
