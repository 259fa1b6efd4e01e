//! Password reset request repository.

use sqlx::PgPool;

use gatehouse_core::{Email, PasswordResetRequestId};

use super::RepositoryError;
use crate::models::PasswordResetRequest;

const COLUMNS: &str = "id, email, status, created_at, updated_at";

/// Repository for password reset request database operations.
pub struct PasswordResetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PasswordResetRepository<'a> {
    /// Create a new password reset repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a new pending request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, email: &Email) -> Result<PasswordResetRequest, RepositoryError> {
        let sql = format!(
            "INSERT INTO password_reset_request (email) VALUES ($1) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PasswordResetRequest>(&sql)
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        Ok(row)
    }

    /// Whether a pending request already exists for this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pending_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(\
                 SELECT 1 FROM password_reset_request \
                 WHERE lower(email) = lower($1) AND status = 'pending')",
        )
        .bind(email)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// List pending requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_pending(&self) -> Result<Vec<PasswordResetRequest>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM password_reset_request \
             WHERE status = 'pending' \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, PasswordResetRequest>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Get a request by ID, but only while it is still pending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_pending(
        &self,
        id: PasswordResetRequestId,
    ) -> Result<Option<PasswordResetRequest>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM password_reset_request WHERE id = $1 AND status = 'pending'"
        );
        let row = sqlx::query_as::<_, PasswordResetRequest>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Mark a request completed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the request doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn mark_completed(&self, id: PasswordResetRequestId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE password_reset_request \
             SET status = 'completed', updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
