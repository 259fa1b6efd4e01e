//! Unified error handling for the service.
//!
//! Every failure a handler can produce converges here and is rendered
//! as an HTTP status plus a `{"error": "..."}` JSON body. Internal
//! details are logged (and reported to Sentry when configured) but
//! never shown to the caller.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::services::{AuthError, PassIssueError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// Caller lacks the required role.
    #[error("{0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// State changed underneath the caller (e.g., a lost transition race).
    #[error("{0}")]
    Conflict(String),

    /// Rate limit exceeded.
    #[error("Too many requests. Please try again later.")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound("Not found".to_owned()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::Unauthorized(e.to_string()),
            AuthError::InvalidEmail(_)
            | AuthError::WeakPassword(_)
            | AuthError::MissingDepartment => Self::BadRequest(e.to_string()),
            AuthError::SuperAdminProtected => Self::Forbidden(e.to_string()),
            AuthError::Repository(inner) => inner.into(),
            AuthError::PasswordHash => Self::Internal(e.to_string()),
        }
    }
}

impl From<PassIssueError> for AppError {
    fn from(e: PassIssueError) -> Self {
        match e {
            PassIssueError::Exhausted => Self::Conflict(e.to_string()),
            PassIssueError::Uid(_) => Self::Internal(e.to_string()),
            PassIssueError::Repository(inner) => inner.into(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest(e.0)
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session error: {e}"))
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("missing".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("who?".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("no".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("raced".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(get_status(AppError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        let err: AppError = RepositoryError::NotFound.into();
        assert_eq!(get_status(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_repository_conflict_keeps_message() {
        let err: AppError = RepositoryError::Conflict("email already exists".to_owned()).into();
        assert_eq!(err.to_string(), "email already exists");
        assert_eq!(get_status(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::SuperAdminProtected.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AuthError::MissingDepartment.into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_validation_error_message_preserved() {
        let err: AppError = ValidationError("Name is required".to_owned()).into();
        assert_eq!(err.to_string(), "Name is required");
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }
}
