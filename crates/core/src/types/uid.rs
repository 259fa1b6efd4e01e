//! Visitor pass code (UID) type.
//!
//! A pass code is issued when a visit request is approved and is what
//! security scans or types at the gate. The format is
//! `<PREFIX><6 digits><month letter>`, e.g. `VMS102345G` for an August
//! approval under the default prefix.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Number of random digits in a pass code.
pub const UID_RANDOM_DIGITS: usize = 6;

/// Smallest value of the random digit block (keeps the width fixed).
pub const UID_NUMBER_MIN: u32 = 100_000;

/// Largest value of the random digit block.
pub const UID_NUMBER_MAX: u32 = 999_999;

/// One letter per calendar month, appended to every pass code.
///
/// The letters are chosen so each month gets a distinct code even where
/// month names share an initial (May=Y, June=U, July=L, August=G).
pub const UID_MONTH_CODES: [char; 12] = [
    'J', 'F', 'M', 'A', 'Y', 'U', 'L', 'G', 'S', 'O', 'N', 'D',
];

/// Errors that can occur when building or parsing a [`VisitorUid`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VisitorUidError {
    /// Prefix is empty or contains non-alphanumeric characters.
    #[error("pass prefix must be non-empty uppercase alphanumeric")]
    BadPrefix,
    /// The digit block is outside the fixed six-digit range.
    #[error("pass number must have exactly {UID_RANDOM_DIGITS} digits")]
    BadNumber,
    /// Month index out of range.
    #[error("month index must be 0..=11, got {0}")]
    BadMonth(usize),
    /// Input does not look like `<PREFIX><6 digits><letter>`.
    #[error("pass code must be of the form <PREFIX><6 digits><month letter>")]
    Malformed,
}

/// A visitor pass code.
///
/// Stored uppercase; [`VisitorUid::parse`] normalizes its input so a
/// hand-typed lowercase code still matches the issued one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct VisitorUid(String);

impl VisitorUid {
    /// Assemble a pass code from its parts.
    ///
    /// `month0` is the zero-based calendar month (January = 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is empty or not uppercase
    /// alphanumeric, the number falls outside the six-digit range, or
    /// the month index exceeds 11.
    pub fn from_parts(prefix: &str, number: u32, month0: usize) -> Result<Self, VisitorUidError> {
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(VisitorUidError::BadPrefix);
        }
        if !(UID_NUMBER_MIN..=UID_NUMBER_MAX).contains(&number) {
            return Err(VisitorUidError::BadNumber);
        }
        let code = Self::month_code(month0).ok_or(VisitorUidError::BadMonth(month0))?;

        Ok(Self(format!("{prefix}{number}{code}")))
    }

    /// The month letter for a zero-based month index.
    #[must_use]
    pub fn month_code(month0: usize) -> Option<char> {
        UID_MONTH_CODES.get(month0).copied()
    }

    /// Parse a pass code, normalizing to uppercase.
    ///
    /// Accepts any non-empty alphanumeric prefix followed by six digits
    /// and a letter, so codes survive a prefix change in configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VisitorUidError::Malformed`] if the shape doesn't match.
    pub fn parse(s: &str) -> Result<Self, VisitorUidError> {
        let s = s.trim().to_uppercase();

        // <prefix (>=1)> <6 digits> <1 letter>, ASCII throughout
        if !s.is_ascii() || s.len() < UID_RANDOM_DIGITS + 2 {
            return Err(VisitorUidError::Malformed);
        }
        let Some(last) = s.chars().last() else {
            return Err(VisitorUidError::Malformed);
        };
        if !last.is_ascii_uppercase() {
            return Err(VisitorUidError::Malformed);
        }

        let body = &s[..s.len() - 1];
        let digit_start = body.len() - UID_RANDOM_DIGITS;
        let (prefix, digits) = body.split_at(digit_start);

        if prefix.is_empty()
            || !prefix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return Err(VisitorUidError::Malformed);
        }

        Ok(Self(s))
    }

    /// Returns the pass code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `VisitorUid` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VisitorUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for VisitorUid {
    type Err = VisitorUidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for VisitorUid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for VisitorUid {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for VisitorUid {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for VisitorUid {
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
    fn test_from_parts_format() {
        let uid = VisitorUid::from_parts("VMS", 102_345, 7).unwrap();
        assert_eq!(uid.as_str(), "VMS102345G");
    }

    #[test]
    fn test_month_codes_distinct() {
        // May=Y, June=U, July=L, August=G keep the overlapping initials apart
        assert_eq!(VisitorUid::month_code(0), Some('J'));
        assert_eq!(VisitorUid::month_code(4), Some('Y'));
        assert_eq!(VisitorUid::month_code(5), Some('U'));
        assert_eq!(VisitorUid::month_code(6), Some('L'));
        assert_eq!(VisitorUid::month_code(7), Some('G'));
        assert_eq!(VisitorUid::month_code(12), None);

        let mut codes = UID_MONTH_CODES.to_vec();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 12);
    }

    #[test]
    fn test_from_parts_rejects_bad_inputs() {
        assert_eq!(
            VisitorUid::from_parts("", 123_456, 0),
            Err(VisitorUidError::BadPrefix)
        );
        assert_eq!(
            VisitorUid::from_parts("vms", 123_456, 0),
            Err(VisitorUidError::BadPrefix)
        );
        assert_eq!(
            VisitorUid::from_parts("VMS", 99_999, 0),
            Err(VisitorUidError::BadNumber)
        );
        assert_eq!(
            VisitorUid::from_parts("VMS", 1_000_000, 0),
            Err(VisitorUidError::BadNumber)
        );
        assert_eq!(
            VisitorUid::from_parts("VMS", 123_456, 12),
            Err(VisitorUidError::BadMonth(12))
        );
    }

    #[test]
    fn test_parse_normalizes_case() {
        let uid = VisitorUid::parse("vms102345g").unwrap();
        assert_eq!(uid.as_str(), "VMS102345G");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let uid = VisitorUid::parse("  VMS102345G ").unwrap();
        assert_eq!(uid.as_str(), "VMS102345G");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "VMS", "102345G", "VMS10234G", "VMS1023456", "VMS10234!G", "A€3456X"] {
            assert!(VisitorUid::parse(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_generated_codes_parse_back() {
        for month0 in 0..12 {
            let uid = VisitorUid::from_parts("GATE1", 500_000, month0).unwrap();
            let parsed = VisitorUid::parse(uid.as_str()).unwrap();
            assert_eq!(parsed, uid);
        }
    }
}
