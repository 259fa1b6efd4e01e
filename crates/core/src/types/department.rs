//! Campus departments that can receive visitors.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Departments a visit request may be addressed to.
///
/// Kept as a fixed list rather than a table: the set changes on an
/// academic timescale and every other part of the system (routing of
/// notification emails, admin scoping, analytics buckets) keys on the
/// exact string.
pub const DEPARTMENTS: [&str; 10] = [
    "CSE",
    "ECE",
    "EEE",
    "MECH",
    "CIVIL",
    "IT",
    "EIE",
    "ADMINISTRATION",
    "LIBRARY",
    "HOSTEL",
];

/// Error returned for a department outside [`DEPARTMENTS`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown department: {0}")]
pub struct DepartmentError(pub String);

/// A department validated against the campus list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Department(String);

impl Department {
    /// Parse a department name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`DepartmentError`] if the name is not on the campus list.
    pub fn parse(s: &str) -> Result<Self, DepartmentError> {
        let upper = s.trim().to_uppercase();
        if DEPARTMENTS.contains(&upper.as_str()) {
            Ok(Self(upper))
        } else {
            Err(DepartmentError(s.to_owned()))
        }
    }

    /// Returns the canonical (uppercase) department name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Department` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Department {
    type Err = DepartmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Department {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Department {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Department {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Department {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_listed_department() {
        for name in DEPARTMENTS {
            assert_eq!(Department::parse(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Department::parse("cse").unwrap().as_str(), "CSE");
        assert_eq!(Department::parse(" library ").unwrap().as_str(), "LIBRARY");
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = Department::parse("PHYSICS").unwrap_err();
        assert_eq!(err, DepartmentError("PHYSICS".to_owned()));
        assert!(Department::parse("").is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let dept = Department::parse("MECH").unwrap();
        assert_eq!(serde_json::to_string(&dept).unwrap(), "\"MECH\"");
    }
}
