//! Staff profile repository.

use sqlx::PgPool;

use gatehouse_core::{Department, Email, ProfileId, UserRole};

use super::RepositoryError;
use crate::models::Profile;

const COLUMNS: &str = "id, email, role, department, created_at, updated_at";

/// Internal row for the login path, carrying the password hash.
#[derive(sqlx::FromRow)]
struct ProfileAuthRow {
    #[sqlx(flatten)]
    profile: Profile,
    password_hash: String,
}

/// Repository for staff profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a profile by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProfileId) -> Result<Option<Profile>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM profile WHERE id = $1");
        let row = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Get a profile by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Profile>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM profile WHERE lower(email) = lower($1)");
        let row = sqlx::query_as::<_, Profile>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Get a profile together with its password hash (login path only).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Profile, String)>, RepositoryError> {
        let sql =
            format!("SELECT {COLUMNS}, password_hash FROM profile WHERE lower(email) = lower($1)");
        let row = sqlx::query_as::<_, ProfileAuthRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|r| (r.profile, r.password_hash)))
    }

    /// List all profiles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Profile>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM profile ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, Profile>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Create a new staff account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        role: UserRole,
        department: Option<&Department>,
    ) -> Result<Profile, RepositoryError> {
        let sql = format!(
            "INSERT INTO profile (email, password_hash, role, department) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .bind(department)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "email already exists"))
    }

    /// Replace an existing account's password, role, and department
    /// (the super admin's "create over existing email" path).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_account(
        &self,
        id: ProfileId,
        password_hash: &str,
        role: UserRole,
        department: Option<&Department>,
    ) -> Result<Profile, RepositoryError> {
        let sql = format!(
            "UPDATE profile \
             SET password_hash = $2, role = $3, department = $4, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(password_hash)
            .bind(role)
            .bind(department)
            .fetch_optional(self.pool)
            .await?;

        row.ok_or(RepositoryError::NotFound)
    }

    /// Set a new password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_password(
        &self,
        id: ProfileId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE profile SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a staff account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProfileId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM profile WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Email addresses of every admin responsible for a department,
    /// used to route new-request notifications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn admin_emails_for(
        &self,
        department: &Department,
    ) -> Result<Vec<Email>, RepositoryError> {
        let emails = sqlx::query_scalar::<_, Email>(
            "SELECT email FROM profile WHERE role = 'department_admin' AND department = $1",
        )
        .bind(department)
        .fetch_all(self.pool)
        .await?;

        Ok(emails)
    }
}
