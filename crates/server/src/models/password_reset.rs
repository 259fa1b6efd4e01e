//! Password reset request domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use gatehouse_core::{Email, PasswordResetRequestId, ResetStatus};

/// A password reset request submitted from the login page and processed
/// by the super admin.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PasswordResetRequest {
    pub id: PasswordResetRequestId,
    pub email: Email,
    pub status: ResetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
