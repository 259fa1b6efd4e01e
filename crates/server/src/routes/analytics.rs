//! Dashboards: visit log and summaries.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;

use crate::db::VisitorRequestRepository;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::VisitorRequest;
use crate::services::VisitSummary;
use crate::services::analytics::summarize;
use crate::state::AppState;

/// Response for the full visit log.
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub success: bool,
    pub logs: Vec<VisitorRequest>,
}

/// Global summary for the super admin, with the department breakdown.
///
/// # Errors
///
/// Returns `AppError::Forbidden` unless the caller is the super admin.
pub async fn overview(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<VisitSummary>, AppError> {
    user.require_super_admin()?;

    let rows = VisitorRequestRepository::new(state.pool())
        .stat_rows()
        .await?;

    Ok(Json(summarize(&rows, Utc::now(), true)))
}

/// Summary scoped to the calling admin's department.
///
/// # Errors
///
/// Returns `AppError::Forbidden` unless the caller is a department admin.
pub async fn department_summary(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<VisitSummary>, AppError> {
    let (_, department) = user.require_department_admin()?;

    let rows = VisitorRequestRepository::new(state.pool())
        .stat_rows_for(&department)
        .await?;

    Ok(Json(summarize(&rows, Utc::now(), false)))
}

/// Full visit log, newest first.
///
/// # Errors
///
/// Returns `AppError::Forbidden` unless the caller is the super admin.
pub async fn logs(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<LogsResponse>, AppError> {
    user.require_super_admin()?;

    let logs = VisitorRequestRepository::new(state.pool())
        .list_all()
        .await?;

    Ok(Json(LogsResponse {
        success: true,
        logs,
    }))
}
