//! Password resets: public submission and super admin processing.

use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use gatehouse_core::{Email, PasswordResetRequestId};

use crate::db::{PasswordResetRepository, ProfileRepository};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::PasswordResetRequest;
use crate::services::{AuthService, rate_limit};
use crate::state::AppState;

use super::Ack;

/// Reset requests allowed per email per window.
const RESET_MAX_ATTEMPTS: u32 = 3;
const RESET_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Public reset request form data.
#[derive(Debug, Deserialize)]
pub struct ResetRequestForm {
    pub email: String,
}

/// Process form data.
#[derive(Debug, Deserialize)]
pub struct ProcessForm {
    pub new_password: String,
}

/// Response for the pending listing.
#[derive(Debug, Serialize)]
pub struct ResetListResponse {
    pub success: bool,
    pub requests: Vec<PasswordResetRequest>,
}

/// Response for a processed reset.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub success: bool,
    pub message: String,
    pub email_sent: bool,
}

/// Submit a password reset request from the login page.
///
/// No authentication required. The response never reveals whether the
/// email belongs to an account.
///
/// # Errors
///
/// Returns `AppError::BadRequest` on a malformed email and
/// `AppError::RateLimited` past the per-email budget.
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<ResetRequestForm>,
) -> Result<Json<Ack>, AppError> {
    let email = Email::parse(form.email.trim())
        .map_err(|_| AppError::BadRequest("Please enter a valid email address".to_owned()))?;

    let decision = state.limiter().check(
        &rate_limit::key("password-reset", &email.normalized()),
        RESET_MAX_ATTEMPTS,
        RESET_WINDOW,
    );
    if !decision.allowed {
        return Err(AppError::RateLimited);
    }

    let profiles = ProfileRepository::new(state.pool());
    if profiles.get_by_email(&email).await?.is_none() {
        // Do not reveal whether the email exists
        return Ok(Json(Ack::ok(
            "If this email is registered, a request has been submitted.",
        )));
    }

    let resets = PasswordResetRepository::new(state.pool());
    if resets.pending_exists(&email).await? {
        return Ok(Json(Ack::ok(
            "A password reset request is already pending for this email.",
        )));
    }

    resets.create(&email).await?;
    tracing::info!("password reset request recorded");

    Ok(Json(Ack::ok(
        "Password reset request submitted. The admin will process it shortly.",
    )))
}

/// List pending reset requests, newest first.
///
/// # Errors
///
/// Returns `AppError::Forbidden` unless the caller is the super admin.
pub async fn list(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ResetListResponse>, AppError> {
    user.require_super_admin()?;

    let requests = PasswordResetRepository::new(state.pool())
        .list_pending()
        .await?;

    Ok(Json(ResetListResponse {
        success: true,
        requests,
    }))
}

/// Process a pending reset: set the new password, mark the request
/// completed, and email the credentials.
///
/// A failure to mark the request completed is logged but does not undo
/// the password change; a failed email is reported via `emailSent`.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the request is missing/processed or
/// the account no longer exists.
pub async fn process(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<PasswordResetRequestId>,
    Json(form): Json<ProcessForm>,
) -> Result<Json<ProcessResponse>, AppError> {
    user.require_super_admin()?;

    let resets = PasswordResetRepository::new(state.pool());
    let request = resets
        .get_pending(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found or already processed".to_owned()))?;

    let profile = ProfileRepository::new(state.pool())
        .get_by_email(&request.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found with this email".to_owned()))?;

    AuthService::new(state.pool())
        .reset_password(profile.id, &form.new_password)
        .await?;

    if let Err(e) = resets.mark_completed(id).await {
        tracing::error!(error = %e, request_id = %id, "failed to mark reset request completed");
    }

    let email_sent = match state
        .email()
        .send_password_reset(
            request.email.as_str(),
            request.email.as_str(),
            &form.new_password,
        )
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, request_id = %id, "failed to send password reset email");
            false
        }
    };

    let message = if email_sent {
        "Password updated and email sent successfully!"
    } else {
        "Password updated but email failed to send. Manual notification required."
    };

    tracing::info!(profile_id = %profile.id, email_sent, "password reset processed");

    Ok(Json(ProcessResponse {
        success: true,
        message: message.to_owned(),
        email_sent,
    }))
}
