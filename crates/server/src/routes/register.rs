//! Public visit registration.

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::db::{ProfileRepository, VisitorRequestRepository};
use crate::error::AppError;
use crate::models::{RegistrationForm, VisitorRequest};
use crate::services::rate_limit;
use crate::state::AppState;

/// Registrations allowed per email per window.
const REGISTRATION_MAX: u32 = 10;
const REGISTRATION_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Response for a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub request: VisitorRequest,
}

/// Handle a public visit registration.
///
/// The request lands as `pending`; department admins are notified by
/// email, and a notification failure never fails the registration.
///
/// # Errors
///
/// Returns `AppError::BadRequest` on validation failures and
/// `AppError::RateLimited` past the per-email budget.
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let new = form.validate()?;

    let decision = state.limiter().check(
        &rate_limit::key("register", &new.email.normalized()),
        REGISTRATION_MAX,
        REGISTRATION_WINDOW,
    );
    if !decision.allowed {
        return Err(AppError::RateLimited);
    }

    let request = VisitorRequestRepository::new(state.pool())
        .create(&new)
        .await?;

    tracing::info!(
        request_id = %request.id,
        department = %request.department,
        "visit request registered"
    );

    notify_department_admins(&state, &request).await;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Registration submitted. You will be notified once it is reviewed."
                .to_owned(),
            request,
        }),
    ))
}

/// Email every admin of the request's department. Failures are logged
/// and swallowed; the registration itself already succeeded.
async fn notify_department_admins(state: &AppState, request: &VisitorRequest) {
    let admins = match ProfileRepository::new(state.pool())
        .admin_emails_for(&request.department)
        .await
    {
        Ok(admins) => admins,
        Err(e) => {
            tracing::error!(error = %e, "failed to look up department admins");
            return;
        }
    };

    if admins.is_empty() {
        tracing::warn!(department = %request.department, "no department admins to notify");
        return;
    }

    let mut sent = 0_usize;
    let mut failed = 0_usize;
    for admin in &admins {
        match state
            .email()
            .send_new_request_notification(
                admin.as_str(),
                &request.department,
                &request.name,
                request.email.as_str(),
                &request.organization,
                &request.purpose,
            )
            .await
        {
            Ok(()) => sent += 1,
            Err(e) => {
                failed += 1;
                tracing::error!(error = %e, admin = %admin, "failed to send new-request notification");
            }
        }
    }

    tracing::info!(department = %request.department, sent, failed, "notified department admins");
}
