//! Staff login and logout.

use std::time::Duration;

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::auth::set_current_profile;
use crate::models::Profile;
use crate::services::{AuthService, rate_limit};
use crate::state::AppState;

use super::Ack;

/// Login attempts allowed per email per window.
const LOGIN_MAX_ATTEMPTS: u32 = 5;
const LOGIN_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Handle login form submission.
///
/// Attempts are rate-limited per email before the password is even
/// checked, so a brute-force run burns its window on failures.
///
/// # Errors
///
/// Returns `AppError::RateLimited` past the attempt budget and
/// `AppError::Unauthorized` on bad credentials.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<Profile>, AppError> {
    let decision = state.limiter().check(
        &rate_limit::key("login", &form.email),
        LOGIN_MAX_ATTEMPTS,
        LOGIN_WINDOW,
    );
    if !decision.allowed {
        return Err(AppError::RateLimited);
    }

    let profile = AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await?;

    set_current_profile(&session, profile.id).await?;

    tracing::info!(profile_id = %profile.id, role = %profile.role, "staff logged in");
    Ok(Json(profile))
}

/// Destroy the session.
///
/// # Errors
///
/// Returns `AppError::Internal` if the session store fails.
pub async fn logout(session: Session) -> Result<Json<Ack>, AppError> {
    session.flush().await?;
    Ok(Json(Ack::ok("Logged out.")))
}
