//! Gate desk: PIN session, pass lookup, check-in and check-out.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{Duration, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use gatehouse_core::{VisitAction, VisitorRequestId, VisitorUid};

use crate::db::VisitorRequestRepository;
use crate::error::AppError;
use crate::middleware::SecurityDesk;
use crate::middleware::auth::{close_security_session, open_security_session};
use crate::models::VisitorRequest;
use crate::state::AppState;

use super::Ack;

/// How far back the expected-visitors view reaches.
const APPROVED_WINDOW_DAYS: i64 = 30;

/// PIN form data.
#[derive(Debug, Deserialize)]
pub struct PinForm {
    pub pin: String,
}

/// Response carrying a single visit request.
#[derive(Debug, Serialize)]
pub struct VisitorResponse {
    pub success: bool,
    pub visitor: VisitorRequest,
}

/// Response carrying a list of visit requests.
#[derive(Debug, Serialize)]
pub struct VisitorListResponse {
    pub success: bool,
    pub visitors: Vec<VisitorRequest>,
}

/// Response for a gate action.
#[derive(Debug, Serialize)]
pub struct GateActionResponse {
    pub success: bool,
    pub message: String,
    pub visitor: VisitorRequest,
}

/// Verify the gate PIN and open an 8-hour desk session.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` on a wrong PIN.
pub async fn open_session(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<PinForm>,
) -> Result<Json<Ack>, AppError> {
    if form.pin != state.config().security_pin.expose_secret() {
        tracing::warn!("gate desk PIN rejected");
        return Err(AppError::Unauthorized("Invalid Access PIN".to_owned()));
    }

    open_security_session(&session).await?;
    tracing::info!("gate desk session opened");
    Ok(Json(Ack::ok("Security session opened.")))
}

/// Close the desk session.
///
/// # Errors
///
/// Returns `AppError::Internal` if the session store fails.
pub async fn close_session(session: Session) -> Result<Json<Ack>, AppError> {
    close_security_session(&session).await?;
    Ok(Json(Ack::ok("Security session closed.")))
}

/// Look up the latest request carrying a pass code (typed or scanned).
///
/// # Errors
///
/// Returns `AppError::BadRequest` on a malformed code and
/// `AppError::NotFound` when no request carries it.
pub async fn lookup(
    _desk: SecurityDesk,
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<VisitorResponse>, AppError> {
    let uid = VisitorUid::parse(&uid)
        .map_err(|_| AppError::BadRequest("Invalid Visitor UID".to_owned()))?;

    let visitor = VisitorRequestRepository::new(state.pool())
        .latest_by_uid(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound("Visitor not found or invalid UID.".to_owned()))?;

    tracing::info!(uid = %uid, visitor = %visitor.id, status = %visitor.status, "gate lookup");

    Ok(Json(VisitorResponse {
        success: true,
        visitor,
    }))
}

/// Check a visitor in.
///
/// # Errors
///
/// See [`gate_action`].
pub async fn check_in(
    _desk: SecurityDesk,
    State(state): State<AppState>,
    Path(id): Path<VisitorRequestId>,
) -> Result<Json<GateActionResponse>, AppError> {
    gate_action(&state, id, VisitAction::CheckIn).await
}

/// Check a visitor out.
///
/// # Errors
///
/// See [`gate_action`].
pub async fn check_out(
    _desk: SecurityDesk,
    State(state): State<AppState>,
    Path(id): Path<VisitorRequestId>,
) -> Result<Json<GateActionResponse>, AppError> {
    gate_action(&state, id, VisitAction::CheckOut).await
}

/// Apply a gate action via a conditional update. When the update matches
/// no row, the current status is re-read to explain the refusal; of two
/// racing calls exactly one takes this error path.
async fn gate_action(
    state: &AppState,
    id: VisitorRequestId,
    action: VisitAction,
) -> Result<Json<GateActionResponse>, AppError> {
    let repo = VisitorRequestRepository::new(state.pool());

    match repo.apply_gate_action(id, action).await? {
        Some(visitor) => {
            let message = match action {
                VisitAction::CheckIn => "Visitor checked in successfully.",
                VisitAction::CheckOut => "Visitor checked out successfully.",
            };
            tracing::info!(visitor = %visitor.id, action = ?action, "gate action applied");
            Ok(Json(GateActionResponse {
                success: true,
                message: message.to_owned(),
                visitor,
            }))
        }
        None => match repo.current_status(id).await? {
            None => Err(AppError::NotFound("Visitor not found".to_owned())),
            Some(current) => Err(AppError::Conflict(action.denial(current))),
        },
    }
}

/// Everyone currently on site (the evacuation list).
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn checked_in(
    _desk: SecurityDesk,
    State(state): State<AppState>,
) -> Result<Json<VisitorListResponse>, AppError> {
    let visitors = VisitorRequestRepository::new(state.pool())
        .list_checked_in()
        .await?;

    Ok(Json(VisitorListResponse {
        success: true,
        visitors,
    }))
}

/// Approved requests from the last 30 days (expected visitors).
///
/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn approved(
    _desk: SecurityDesk,
    State(state): State<AppState>,
) -> Result<Json<VisitorListResponse>, AppError> {
    let since = Utc::now() - Duration::days(APPROVED_WINDOW_DAYS);
    let visitors = VisitorRequestRepository::new(state.pool())
        .list_approved_since(since)
        .await?;

    Ok(Json(VisitorListResponse {
        success: true,
        visitors,
    }))
}
