//! Staff account bootstrap command.
//!
//! Unlike the admin console's create endpoint, this can mint the first
//! `super_admin` account.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use gatehouse_core::{Department, Email, UserRole};
use gatehouse_server::db::ProfileRepository;
use gatehouse_server::services::auth::hash_password;

use super::{CommandError, database_url};

/// Create a staff account.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for a bad email, role, or
/// department combination, and database errors otherwise.
pub async fn create(
    email: &str,
    password: &str,
    role: &str,
    department: Option<&str>,
) -> Result<(), CommandError> {
    let email = Email::parse(email)
        .map_err(|e| CommandError::InvalidArgument(format!("invalid email: {e}")))?;
    let role: UserRole = role.parse().map_err(CommandError::InvalidArgument)?;

    let department = match (role, department) {
        (UserRole::DepartmentAdmin, Some(d)) => Some(
            Department::parse(d)
                .map_err(|e| CommandError::InvalidArgument(e.to_string()))?,
        ),
        (UserRole::DepartmentAdmin, None) => {
            return Err(CommandError::InvalidArgument(
                "department is required for department_admin".to_owned(),
            ));
        }
        _ => None,
    };

    let password_hash = hash_password(password)?;

    let database_url = database_url()?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let profile = ProfileRepository::new(&pool)
        .create(&email, &password_hash, role, department.as_ref())
        .await
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;

    tracing::info!(
        profile_id = %profile.id,
        email = %profile.email,
        role = %profile.role,
        "staff account created"
    );
    Ok(())
}
