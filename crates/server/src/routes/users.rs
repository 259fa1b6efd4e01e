//! Super admin staff account management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use gatehouse_core::{Department, ProfileId, UserRole};

use crate::db::ProfileRepository;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::Profile;
use crate::services::AuthService;
use crate::services::auth::CreateOutcome;
use crate::state::AppState;

use super::Ack;

/// Create user form data.
#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub department: Option<String>,
}

/// Response for the user listing.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<Profile>,
}

/// Response for a created or re-credentialed account.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub message: String,
    pub user: Profile,
}

/// List all staff accounts, newest first.
///
/// # Errors
///
/// Returns `AppError::Forbidden` unless the caller is the super admin.
pub async fn list(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, AppError> {
    user.require_super_admin()?;

    let users = ProfileRepository::new(state.pool()).list_all().await?;

    Ok(Json(UserListResponse {
        success: true,
        users,
    }))
}

/// Create a staff account.
///
/// Only `department_admin` and `security` can be created here. If the
/// email already belongs to a non-super-admin account, that account is
/// re-credentialed instead (password, role, department).
///
/// # Errors
///
/// Returns `AppError::BadRequest` on validation failures and
/// `AppError::Forbidden` when targeting a super admin account.
pub async fn create(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(form): Json<CreateUserForm>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    user.require_super_admin()?;

    let role: UserRole = form
        .role
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid role".to_owned()))?;
    if role == UserRole::SuperAdmin {
        return Err(AppError::BadRequest("Invalid role".to_owned()));
    }

    let department = match form.department.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => Some(
            Department::parse(d)
                .map_err(|_| AppError::BadRequest("Please select a valid department".to_owned()))?,
        ),
        _ => None,
    };

    let outcome = AuthService::new(state.pool())
        .create_account(&form.email, &form.password, role, department)
        .await?;

    match outcome {
        CreateOutcome::Created(profile) => {
            tracing::info!(profile_id = %profile.id, role = %profile.role, "staff account created");
            Ok((
                StatusCode::CREATED,
                Json(UserResponse {
                    success: true,
                    message: format!("User {} created successfully.", profile.email),
                    user: profile,
                }),
            ))
        }
        CreateOutcome::PasswordUpdated(profile) => {
            tracing::info!(profile_id = %profile.id, "existing staff account re-credentialed");
            Ok((
                StatusCode::OK,
                Json(UserResponse {
                    success: true,
                    message: format!("User {} password updated successfully.", profile.email),
                    user: profile,
                }),
            ))
        }
    }
}

/// Delete a staff account.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the account doesn't exist.
pub async fn delete(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<ProfileId>,
) -> Result<Json<Ack>, AppError> {
    user.require_super_admin()?;

    ProfileRepository::new(state.pool()).delete(id).await?;

    tracing::info!(profile_id = %id, "staff account deleted");
    Ok(Json(Ack::ok("User deleted successfully.")))
}
