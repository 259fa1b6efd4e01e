//! Staff account domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use gatehouse_core::{Department, Email, ProfileId, UserRole};

/// A staff account.
///
/// The password hash deliberately lives outside this struct; only the
/// login path reads it, via
/// [`ProfileRepository::get_password_hash`](crate::db::ProfileRepository::get_password_hash).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    /// Unique profile ID.
    pub id: ProfileId,
    /// Login email address.
    pub email: Email,
    /// Permission level.
    pub role: UserRole,
    /// Department scope; present iff the role is `department_admin`.
    pub department: Option<Department>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}
