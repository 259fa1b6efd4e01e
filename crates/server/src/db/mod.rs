//! Database operations for the Gatehouse `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `profile` - Staff accounts (super admin, department admins, security)
//! - `visitor_request` - Visit requests and their lifecycle timestamps
//! - `password_reset_request` - Reset requests awaiting the super admin
//! - `session` - Cookie session storage (tower-sessions)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p gatehouse-cli -- migrate
//! ```
//!
//! Queries use sqlx's runtime API; the enum-ish columns (status, role,
//! department) are TEXT and decode straight into the core newtypes.

pub mod password_resets;
pub mod profiles;
pub mod visitor_requests;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use password_resets::PasswordResetRepository;
pub use profiles::ProfileRepository;
pub use visitor_requests::VisitorRequestRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or pass code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into [`Self::Conflict`].
    pub(crate) fn from_sqlx(e: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
