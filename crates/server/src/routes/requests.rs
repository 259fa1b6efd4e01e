//! Department admin request review: list, approve, reject.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use gatehouse_core::{VisitStatus, VisitorRequestId};

use crate::db::VisitorRequestRepository;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::VisitorRequest;
use crate::services::PassIssuer;
use crate::state::AppState;

const ALREADY_PROCESSED: &str = "This request has already been processed.";
const NOT_FOUND_OR_FOREIGN: &str = "Unauthorized or Request Not Found";

/// Query parameters for the request listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<VisitStatus>,
}

/// Response for the request listing.
#[derive(Debug, Serialize)]
pub struct RequestListResponse {
    pub success: bool,
    pub requests: Vec<VisitorRequest>,
}

/// Response for an approve/reject decision.
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub success: bool,
    pub message: String,
    pub request: VisitorRequest,
}

/// List the admin's own department's requests, newest first.
///
/// # Errors
///
/// Returns `AppError::Forbidden` unless the caller is a department admin.
pub async fn list(
    user: CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<RequestListResponse>, AppError> {
    let (_, department) = user.require_department_admin()?;

    let requests = VisitorRequestRepository::new(state.pool())
        .list_for_department(&department, query.status)
        .await?;

    Ok(Json(RequestListResponse {
        success: true,
        requests,
    }))
}

/// Approve a pending request: issue a pass code and email the visitor.
///
/// The update is conditional on the row still being `pending`, so two
/// racing approvals resolve to one winner. The approval stands even if
/// the notification email fails.
///
/// # Errors
///
/// Returns `AppError::NotFound` for a missing or foreign-department
/// request and `AppError::Conflict` when the request was already
/// processed or the pass pool is exhausted.
pub async fn approve(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<VisitorRequestId>,
) -> Result<Json<DecisionResponse>, AppError> {
    let (_, department) = user.require_department_admin()?;
    let repo = VisitorRequestRepository::new(state.pool());

    let request = repo
        .get(id)
        .await?
        .filter(|r| r.department == department)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_OR_FOREIGN.to_owned()))?;

    if request.status != VisitStatus::Pending {
        return Err(AppError::Conflict(ALREADY_PROCESSED.to_owned()));
    }

    let uid = PassIssuer::new(state.pool(), &state.config().pass_prefix)
        .issue()
        .await?;

    let Some(approved) = repo.approve(id, &uid).await? else {
        // Lost the race: someone processed the request in between
        return Err(AppError::Conflict(ALREADY_PROCESSED.to_owned()));
    };

    tracing::info!(request_id = %approved.id, uid = %uid, "visit request approved");

    if let Err(e) = state
        .email()
        .send_visit_approved(
            approved.email.as_str(),
            &approved.name,
            &approved.department,
            &uid,
        )
        .await
    {
        tracing::error!(error = %e, request_id = %approved.id, "failed to send approval email");
    }

    Ok(Json(DecisionResponse {
        success: true,
        message: format!("Visitor approved with UID: {uid}"),
        request: approved,
    }))
}

/// Reject a pending request.
///
/// # Errors
///
/// Returns `AppError::NotFound` for a missing or foreign-department
/// request and `AppError::Conflict` when the request was already
/// processed.
pub async fn reject(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<VisitorRequestId>,
) -> Result<Json<DecisionResponse>, AppError> {
    let (_, department) = user.require_department_admin()?;
    let repo = VisitorRequestRepository::new(state.pool());

    let request = repo
        .get(id)
        .await?
        .filter(|r| r.department == department)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_OR_FOREIGN.to_owned()))?;

    if request.status != VisitStatus::Pending {
        return Err(AppError::Conflict(ALREADY_PROCESSED.to_owned()));
    }

    let Some(rejected) = repo.reject(id).await? else {
        return Err(AppError::Conflict(ALREADY_PROCESSED.to_owned()));
    };

    tracing::info!(request_id = %rejected.id, "visit request rejected");

    Ok(Json(DecisionResponse {
        success: true,
        message: "Visitor request rejected.".to_owned(),
        request: rejected,
    }))
}
