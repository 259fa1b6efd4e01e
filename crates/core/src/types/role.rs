//! Staff roles.

use serde::{Deserialize, Serialize};

/// Role attached to a staff profile.
///
/// The role decides which part of the service a login may reach:
/// account management and global analytics (`SuperAdmin`), request
/// review for one department (`DepartmentAdmin`), or the gate desk
/// (`Security`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    DepartmentAdmin,
    Security,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::DepartmentAdmin => "department_admin",
            Self::Security => "security",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "department_admin" => Ok(Self::DepartmentAdmin),
            "security" => Ok(Self::Security),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(feature = "postgres")]
crate::types::status::text_backed!(UserRole);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_roundtrip() {
        for role in [
            UserRole::SuperAdmin,
            UserRole::DepartmentAdmin,
            UserRole::Security,
        ] {
            let parsed: UserRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("admin".parse::<UserRole>().is_err());
        assert!("SUPER_ADMIN".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&UserRole::DepartmentAdmin).unwrap(),
            "\"department_admin\""
        );
    }
}
