//! Authentication and staff account service.
//!
//! Passwords are hashed with Argon2id. Account rules follow the admin
//! console's behavior: creating a user whose email already exists resets
//! that account's password and role instead, unless the existing account
//! is a super admin, which is refused outright.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use gatehouse_core::{Department, Email, ProfileId, UserRole};

use crate::db::{ProfileRepository, RepositoryError};
use crate::models::Profile;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("Please enter a valid email address")]
    InvalidEmail(#[from] gatehouse_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Password too weak or invalid.
    #[error("{0}")]
    WeakPassword(String),

    /// Department admins must carry a department.
    #[error("Department is required for department admins")]
    MissingDepartment,

    /// The email belongs to a super admin account.
    #[error("Cannot modify Super Admin accounts. Use a different email.")]
    SuperAdminProtected,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

/// What the account-create path actually did.
#[derive(Debug)]
pub enum CreateOutcome {
    /// A brand-new account was created.
    Created(Profile),
    /// The email already existed; the account was re-credentialed.
    PasswordUpdated(Profile),
}

/// Authentication service.
pub struct AuthService<'a> {
    profiles: ProfileRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            profiles: ProfileRepository::new(pool),
        }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is
    /// wrong; the two cases are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<Profile, AuthError> {
        let email = Email::parse(email)?;

        let (profile, password_hash) = self
            .profiles
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(profile)
    }

    /// Create a staff account, or re-credential an existing one.
    ///
    /// `department` is required for department admins and discarded for
    /// every other role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SuperAdminProtected` if the email belongs to a
    /// super admin, `AuthError::MissingDepartment`/`WeakPassword` on
    /// validation failures.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
        department: Option<Department>,
    ) -> Result<CreateOutcome, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let department = match role {
            UserRole::DepartmentAdmin => Some(department.ok_or(AuthError::MissingDepartment)?),
            _ => None,
        };

        let password_hash = hash_password(password)?;

        if let Some(existing) = self.profiles.get_by_email(&email).await? {
            if existing.role == UserRole::SuperAdmin {
                return Err(AuthError::SuperAdminProtected);
            }

            let updated = self
                .profiles
                .update_account(existing.id, &password_hash, role, department.as_ref())
                .await?;
            return Ok(CreateOutcome::PasswordUpdated(updated));
        }

        let created = self
            .profiles
            .create(&email, &password_hash, role, department.as_ref())
            .await?;
        Ok(CreateOutcome::Created(created))
    }

    /// Set a new password on an existing account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short,
    /// `AuthError::Repository` on database failures.
    pub async fn reset_password(&self, id: ProfileId, password: &str) -> Result<(), AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;
        self.profiles.update_password(id, &password_hash).await?;
        Ok(())
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_roundtrip() {
        let hash = hash_password("gate-keeper-7").unwrap();
        assert!(verify_password("gate-keeper-7", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("abc"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("abcdef").is_ok());
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("whatever", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
