//! Visitor pass code issuance.
//!
//! A candidate code is random, so two approvals can collide; the issuer
//! checks the database for an existing row and retries a bounded number
//! of times. This is a check-then-act race tolerated by low volume; the
//! unique index on `visitor_uid` is the backstop, surfacing as a
//! conflict on the approval update itself.

use chrono::{Datelike, Utc};
use rand::Rng;
use sqlx::PgPool;
use thiserror::Error;

use gatehouse_core::uid::{UID_NUMBER_MAX, UID_NUMBER_MIN};
use gatehouse_core::{VisitorUid, VisitorUidError};

use crate::db::{RepositoryError, VisitorRequestRepository};

/// How many candidate codes to try before giving up.
pub const MAX_ATTEMPTS: u32 = 5;

/// Errors that can occur while issuing a pass code.
#[derive(Debug, Error)]
pub enum PassIssueError {
    /// Every candidate collided with an existing code.
    #[error("Failed to generate unique UID. Please try again.")]
    Exhausted,

    /// The configured prefix cannot form a valid code.
    #[error("invalid pass code: {0}")]
    Uid(#[from] VisitorUidError),

    /// Database error while checking for collisions.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Issues pass codes that are unused at the time of the check.
pub struct PassIssuer<'a> {
    requests: VisitorRequestRepository<'a>,
    prefix: &'a str,
}

impl<'a> PassIssuer<'a> {
    /// Create a new pass issuer for the configured prefix.
    #[must_use]
    pub const fn new(pool: &'a PgPool, prefix: &'a str) -> Self {
        Self {
            requests: VisitorRequestRepository::new(pool),
            prefix,
        }
    }

    /// Generate a pass code not currently present in the database.
    ///
    /// # Errors
    ///
    /// Returns [`PassIssueError::Exhausted`] after [`MAX_ATTEMPTS`]
    /// collisions.
    pub async fn issue(&self) -> Result<VisitorUid, PassIssueError> {
        let month0 = usize::try_from(Utc::now().month0()).unwrap_or_default();

        for attempt in 1..=MAX_ATTEMPTS {
            let candidate = generate_with(self.prefix, month0, &mut rand::rng())?;

            if !self.requests.uid_exists(&candidate).await? {
                return Ok(candidate);
            }

            tracing::debug!(
                candidate = %candidate,
                attempt,
                "pass code collision, retrying"
            );
        }

        Err(PassIssueError::Exhausted)
    }
}

/// Build one candidate code for the given month from the supplied RNG.
fn generate_with(
    prefix: &str,
    month0: usize,
    rng: &mut impl Rng,
) -> Result<VisitorUid, VisitorUidError> {
    let number = rng.random_range(UID_NUMBER_MIN..=UID_NUMBER_MAX);
    VisitorUid::from_parts(prefix, number, month0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_generated_code_shape() {
        let mut rng = StdRng::seed_from_u64(7);

        for month0 in 0..12 {
            let uid = generate_with("VMS", month0, &mut rng).unwrap();
            let s = uid.as_str();

            assert!(s.starts_with("VMS"), "{s}");
            let tail = &s[3..];
            assert_eq!(tail.len(), 7, "{s}");
            assert!(tail[..6].chars().all(|c| c.is_ascii_digit()), "{s}");
            assert_eq!(
                tail.chars().last(),
                VisitorUid::month_code(month0),
                "{s}"
            );
        }
    }

    #[test]
    fn test_generated_codes_parse_back() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let uid = generate_with("GATE", 3, &mut rng).unwrap();
            assert_eq!(VisitorUid::parse(uid.as_str()).unwrap(), uid);
        }
    }

    #[test]
    fn test_bad_prefix_surfaces() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_with("vms", 0, &mut rng).is_err());
    }
}
