//! Authentication extractors.
//!
//! Two independent credentials exist: staff log in with email+password
//! and get their profile id stored in the session; the gate desk opens a
//! time-boxed session by presenting the shared PIN. Handlers require one
//! or the other by taking the matching extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use gatehouse_core::{Department, ProfileId, UserRole};

use crate::db::ProfileRepository;
use crate::error::AppError;
use crate::models::Profile;
use crate::state::AppState;

/// Session keys.
pub mod session_keys {
    /// Logged-in staff profile id.
    pub const PROFILE_ID: &str = "profile_id";
    /// Gate desk session payload.
    pub const SECURITY_DESK: &str = "security_desk";
}

/// How long a gate desk session stays valid after the PIN is entered.
pub const SECURITY_SESSION_HOURS: i64 = 8;

/// Extractor that requires a logged-in staff member.
///
/// The profile is re-loaded from the database on every request, so role
/// or department changes (and deletions) take effect immediately.
pub struct CurrentUser(pub Profile);

impl CurrentUser {
    /// Require the super admin role.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for any other role.
    pub fn require_super_admin(self) -> Result<Profile, AppError> {
        if self.0.role == UserRole::SuperAdmin {
            Ok(self.0)
        } else {
            Err(AppError::Forbidden(
                "Unauthorized: Super admin access required".to_owned(),
            ))
        }
    }

    /// Require a department admin, yielding the profile and its
    /// department scope.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` for any other role, and
    /// `AppError::Internal` if a department admin row is missing its
    /// department (the schema forbids this).
    pub fn require_department_admin(self) -> Result<(Profile, Department), AppError> {
        if self.0.role != UserRole::DepartmentAdmin {
            return Err(AppError::Forbidden(
                "Unauthorized: Department admin access required".to_owned(),
            ));
        }
        let department = self.0.department.clone().ok_or_else(|| {
            AppError::Internal("department admin without department".to_owned())
        })?;
        Ok((self.0, department))
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = require_session(parts)?;

        let profile_id: ProfileId = session
            .get(session_keys::PROFILE_ID)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Not logged in".to_owned()))?;

        let profile = ProfileRepository::new(state.pool())
            .get(profile_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_owned()))?;

        Ok(Self(profile))
    }
}

/// Payload stored in the session while the gate desk is unlocked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SecurityDeskSession {
    pub granted_at: DateTime<Utc>,
}

/// Extractor that requires an unlocked gate desk session.
pub struct SecurityDesk;

impl<S> FromRequestParts<S> for SecurityDesk
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = require_session(parts)?;

        let desk: SecurityDeskSession = session
            .get(session_keys::SECURITY_DESK)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized("Unauthorized: Invalid Security Session".to_owned())
            })?;

        let age = Utc::now() - desk.granted_at;
        if age > Duration::hours(SECURITY_SESSION_HOURS) {
            return Err(AppError::Unauthorized(
                "Unauthorized: Invalid Security Session".to_owned(),
            ));
        }

        Ok(Self)
    }
}

/// Mark the session as a logged-in staff member.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_profile(
    session: &Session,
    profile_id: ProfileId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::PROFILE_ID, profile_id).await
}

/// Unlock the gate desk for the next [`SECURITY_SESSION_HOURS`] hours.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn open_security_session(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(
            session_keys::SECURITY_DESK,
            SecurityDeskSession {
                granted_at: Utc::now(),
            },
        )
        .await
}

/// Lock the gate desk again.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn close_security_session(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<SecurityDeskSession>(session_keys::SECURITY_DESK)
        .await?;
    Ok(())
}

fn require_session(parts: &mut Parts) -> Result<Session, AppError> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::Internal("session layer missing".to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn profile(role: UserRole, department: Option<&str>) -> Profile {
        Profile {
            id: ProfileId::new(Uuid::new_v4()),
            email: "staff@example.com".parse().unwrap(),
            role,
            department: department.map(|d| Department::parse(d).unwrap()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_super_admin() {
        assert!(CurrentUser(profile(UserRole::SuperAdmin, None))
            .require_super_admin()
            .is_ok());
        assert!(matches!(
            CurrentUser(profile(UserRole::Security, None)).require_super_admin(),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_require_department_admin_yields_scope() {
        let (_, dept) = CurrentUser(profile(UserRole::DepartmentAdmin, Some("CSE")))
            .require_department_admin()
            .unwrap();
        assert_eq!(dept.as_str(), "CSE");

        assert!(matches!(
            CurrentUser(profile(UserRole::SuperAdmin, None)).require_department_admin(),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            CurrentUser(profile(UserRole::DepartmentAdmin, None)).require_department_admin(),
            Err(AppError::Internal(_))
        ));
    }
}
