//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (verifies database)
//!
//! # Public
//! POST /api/visitors            - Register a visit request
//! POST /api/password-resets     - Request a password reset
//!
//! # Auth
//! POST /api/auth/login          - Staff login
//! POST /api/auth/logout         - Logout
//!
//! # Security desk (PIN session)
//! POST   /api/security/session              - Verify PIN, open session
//! DELETE /api/security/session              - Close session
//! GET    /api/security/lookup/{uid}         - Lookup by pass code
//! POST   /api/security/visitors/{id}/check-in
//! POST   /api/security/visitors/{id}/check-out
//! GET    /api/security/checked-in           - On-site list (evacuation)
//! GET    /api/security/approved             - Approved in last 30 days
//!
//! # Department admin
//! GET  /api/admin/requests                  - Own department's requests
//! POST /api/admin/requests/{id}/approve     - Issue pass, email visitor
//! POST /api/admin/requests/{id}/reject
//! GET  /api/admin/analytics                 - Department summary
//!
//! # Super admin
//! GET    /api/super/users
//! POST   /api/super/users
//! DELETE /api/super/users/{id}
//! GET    /api/super/logs                    - Full visit log
//! GET    /api/super/analytics               - Global summary
//! GET    /api/super/password-resets
//! POST   /api/super/password-resets/{id}/process
//! ```

pub mod analytics;
pub mod auth;
pub mod password_resets;
pub mod register;
pub mod requests;
pub mod security;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;

/// Plain acknowledgement body shared by the simpler endpoints.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Create the security desk routes router.
pub fn security_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/session",
            post(security::open_session).delete(security::close_session),
        )
        .route("/lookup/{uid}", get(security::lookup))
        .route("/visitors/{id}/check-in", post(security::check_in))
        .route("/visitors/{id}/check-out", post(security::check_out))
        .route("/checked-in", get(security::checked_in))
        .route("/approved", get(security::approved))
}

/// Create the department admin routes router.
pub fn department_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(requests::list))
        .route("/requests/{id}/approve", post(requests::approve))
        .route("/requests/{id}/reject", post(requests::reject))
        .route("/analytics", get(analytics::department_summary))
}

/// Create the super admin routes router.
pub fn super_admin_routes() -> Router<AppState> {
    use axum::routing::delete;

    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/{id}", delete(users::delete))
        .route("/logs", get(analytics::logs))
        .route("/analytics", get(analytics::overview))
        .route("/password-resets", get(password_resets::list))
        .route(
            "/password-resets/{id}/process",
            post(password_resets::process),
        )
}

/// Create all routes for the service.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Public
        .route("/api/visitors", post(register::register))
        .route("/api/password-resets", post(password_resets::submit))
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        // Security desk
        .nest("/api/security", security_routes())
        // Department admin
        .nest("/api/admin", department_admin_routes())
        // Super admin
        .nest("/api/super", super_admin_routes())
}
