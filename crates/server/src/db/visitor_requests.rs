//! Visit request repository.
//!
//! Lifecycle transitions are conditional updates: the `WHERE` clause
//! matches the row only when the current status equals the single legal
//! predecessor, so concurrent gate actions on one row resolve to exactly
//! one winner at the database. Callers that receive `None` re-read the
//! current status to build a descriptive refusal.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gatehouse_core::{Department, VisitAction, VisitStatus, VisitorRequestId, VisitorUid};

use super::RepositoryError;
use crate::models::{NewVisitorRequest, StatRow, VisitorRequest};

const COLUMNS: &str = "id, name, designation, organization, phone, email, purpose, department, \
     photo_url, status, visitor_uid, expected_date, expected_time, created_at, \
     check_in_time, check_out_time";

/// Repository for visit request database operations.
pub struct VisitorRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VisitorRequestRepository<'a> {
    /// Create a new visit request repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new pending request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewVisitorRequest) -> Result<VisitorRequest, RepositoryError> {
        let sql = format!(
            "INSERT INTO visitor_request \
                 (name, designation, organization, phone, email, purpose, department, \
                  photo_url, expected_date, expected_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, VisitorRequest>(&sql)
            .bind(&new.name)
            .bind(&new.designation)
            .bind(&new.organization)
            .bind(&new.phone)
            .bind(&new.email)
            .bind(&new.purpose)
            .bind(&new.department)
            .bind(&new.photo_url)
            .bind(new.expected_date)
            .bind(new.expected_time)
            .fetch_one(self.pool)
            .await?;

        Ok(row)
    }

    /// Get a request by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: VisitorRequestId,
    ) -> Result<Option<VisitorRequest>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM visitor_request WHERE id = $1");
        let row = sqlx::query_as::<_, VisitorRequest>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Get the most recent request carrying a pass code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_by_uid(
        &self,
        uid: &VisitorUid,
    ) -> Result<Option<VisitorRequest>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM visitor_request \
             WHERE visitor_uid = $1 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, VisitorRequest>(&sql)
            .bind(uid)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Whether any row already carries this pass code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn uid_exists(&self, uid: &VisitorUid) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM visitor_request WHERE visitor_uid = $1)",
        )
        .bind(uid)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Approve a pending request, stamping its pass code.
    ///
    /// Returns `None` when the row was not in `pending` (already
    /// processed, or lost a race).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the pass code collided with
    /// a concurrent approval, `RepositoryError::Database` otherwise.
    pub async fn approve(
        &self,
        id: VisitorRequestId,
        uid: &VisitorUid,
    ) -> Result<Option<VisitorRequest>, RepositoryError> {
        let sql = format!(
            "UPDATE visitor_request \
             SET status = 'approved', visitor_uid = $2 \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VisitorRequest>(&sql)
            .bind(id)
            .bind(uid)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "pass code already in use"))
    }

    /// Reject a pending request.
    ///
    /// Returns `None` when the row was not in `pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn reject(
        &self,
        id: VisitorRequestId,
    ) -> Result<Option<VisitorRequest>, RepositoryError> {
        let sql = format!(
            "UPDATE visitor_request \
             SET status = 'rejected' \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, VisitorRequest>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Apply a gate action (check-in or check-out), stamping its
    /// timestamp. Returns `None` when the row was not in the action's
    /// required status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn apply_gate_action(
        &self,
        id: VisitorRequestId,
        action: VisitAction,
    ) -> Result<Option<VisitorRequest>, RepositoryError> {
        let stamp_column = match action {
            VisitAction::CheckIn => "check_in_time",
            VisitAction::CheckOut => "check_out_time",
        };
        let sql = format!(
            "UPDATE visitor_request \
             SET status = $2, {stamp_column} = now() \
             WHERE id = $1 AND status = $3 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, VisitorRequest>(&sql)
            .bind(id)
            .bind(action.resulting_status())
            .bind(action.required_status())
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Read just the current status of a row (used to explain a refused
    /// transition).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn current_status(
        &self,
        id: VisitorRequestId,
    ) -> Result<Option<VisitStatus>, RepositoryError> {
        let status =
            sqlx::query_scalar::<_, VisitStatus>("SELECT status FROM visitor_request WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(status)
    }

    /// List requests for one department, optionally filtered by status,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_department(
        &self,
        department: &Department,
        status: Option<VisitStatus>,
    ) -> Result<Vec<VisitorRequest>, RepositoryError> {
        let rows = if let Some(status) = status {
            let sql = format!(
                "SELECT {COLUMNS} FROM visitor_request \
                 WHERE department = $1 AND status = $2 \
                 ORDER BY created_at DESC"
            );
            sqlx::query_as::<_, VisitorRequest>(&sql)
                .bind(department)
                .bind(status)
                .fetch_all(self.pool)
                .await?
        } else {
            let sql = format!(
                "SELECT {COLUMNS} FROM visitor_request \
                 WHERE department = $1 \
                 ORDER BY created_at DESC"
            );
            sqlx::query_as::<_, VisitorRequest>(&sql)
                .bind(department)
                .fetch_all(self.pool)
                .await?
        };

        Ok(rows)
    }

    /// List every request, newest first (the super admin's visit log).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<VisitorRequest>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM visitor_request ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, VisitorRequest>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// List everyone currently on site, most recent check-in first
    /// (the evacuation list).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_checked_in(&self) -> Result<Vec<VisitorRequest>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM visitor_request \
             WHERE status = 'checked_in' \
             ORDER BY check_in_time DESC"
        );
        let rows = sqlx::query_as::<_, VisitorRequest>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// List approved requests created since `since` (the gate desk's
    /// expected-visitors view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_approved_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<VisitorRequest>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM visitor_request \
             WHERE status = 'approved' AND created_at >= $1 \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, VisitorRequest>(&sql)
            .bind(since)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Slim rows for the global analytics summary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stat_rows(&self) -> Result<Vec<StatRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, StatRow>(
            "SELECT status, department, created_at FROM visitor_request",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Slim rows for one department's analytics summary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stat_rows_for(
        &self,
        department: &Department,
    ) -> Result<Vec<StatRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, StatRow>(
            "SELECT status, department, created_at FROM visitor_request WHERE department = $1",
        )
        .bind(department)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
