//! Status enums and the visit state machine.
//!
//! A visit request moves `pending -> {approved, rejected}`,
//! `approved -> checked_in`, `checked_in -> checked_out`. Each
//! transition has exactly one legal predecessor, which is what lets the
//! database apply transitions as conditional updates: the row is matched
//! on `(id, expected status)`, so of two racing gate actions exactly one
//! wins and the other reports a descriptive refusal.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a visit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    CheckedIn,
    CheckedOut,
}

impl VisitStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::CheckedIn,
        Self::CheckedOut,
    ];

    /// Whether a transition from `self` to `next` is legal.
    #[must_use]
    pub const fn may_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved | Self::Rejected)
                | (Self::Approved, Self::CheckedIn)
                | (Self::CheckedIn, Self::CheckedOut)
        )
    }

    /// The single status a row must currently hold for `next` to be
    /// applied. `Pending` has no predecessor (it is the initial state).
    #[must_use]
    pub const fn predecessor(next: Self) -> Option<Self> {
        match next {
            Self::Pending => None,
            Self::Approved | Self::Rejected => Some(Self::Pending),
            Self::CheckedIn => Some(Self::Approved),
            Self::CheckedOut => Some(Self::CheckedIn),
        }
    }

    /// Whether no further transition can leave this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::CheckedOut)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
        }
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VisitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "checked_in" => Ok(Self::CheckedIn),
            "checked_out" => Ok(Self::CheckedOut),
            _ => Err(format!("invalid visit status: {s}")),
        }
    }
}

/// A gate action performed by security on an approved visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitAction {
    CheckIn,
    CheckOut,
}

impl VisitAction {
    /// The status the row must currently hold for this action to apply.
    #[must_use]
    pub const fn required_status(self) -> VisitStatus {
        match self {
            Self::CheckIn => VisitStatus::Approved,
            Self::CheckOut => VisitStatus::CheckedIn,
        }
    }

    /// The status the row holds after this action.
    #[must_use]
    pub const fn resulting_status(self) -> VisitStatus {
        match self {
            Self::CheckIn => VisitStatus::CheckedIn,
            Self::CheckOut => VisitStatus::CheckedOut,
        }
    }

    /// Human-readable refusal for an action attempted against `current`,
    /// shown to the losing side of a race or to an out-of-order scan.
    #[must_use]
    pub fn denial(self, current: VisitStatus) -> String {
        match (self, current) {
            (Self::CheckIn, VisitStatus::CheckedIn) => "Visitor already checked in.".to_owned(),
            (Self::CheckIn, VisitStatus::CheckedOut) => {
                "Visitor pass already used (checked out).".to_owned()
            }
            (Self::CheckIn, status) => {
                format!("Cannot check in. Visitor status is '{status}'.")
            }
            (Self::CheckOut, VisitStatus::CheckedOut) => "Visitor already checked out.".to_owned(),
            (Self::CheckOut, VisitStatus::Approved) => {
                "Visitor has not checked in yet.".to_owned()
            }
            (Self::CheckOut, status) => {
                format!("Cannot check out. Visitor status is '{status}'.")
            }
        }
    }
}

/// Status of a password reset request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResetStatus {
    #[default]
    Pending,
    Completed,
}

impl ResetStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ResetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid reset status: {s}")),
        }
    }
}

// SQLx support: both enums are stored as TEXT columns.

#[cfg(feature = "postgres")]
mod postgres {
    use super::{ResetStatus, VisitStatus};

    macro_rules! text_backed {
        ($name:ident) => {
            impl sqlx::Type<sqlx::Postgres> for $name {
                fn type_info() -> sqlx::postgres::PgTypeInfo {
                    <String as sqlx::Type<sqlx::Postgres>>::type_info()
                }

                fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                    <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
                }
            }

            impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
                fn decode(
                    value: sqlx::postgres::PgValueRef<'r>,
                ) -> Result<Self, sqlx::error::BoxDynError> {
                    let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                    Ok(s.parse::<Self>()?)
                }
            }

            impl sqlx::Encode<'_, sqlx::Postgres> for $name {
                fn encode_by_ref(
                    &self,
                    buf: &mut sqlx::postgres::PgArgumentBuffer,
                ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                    <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
                }
            }
        };
    }

    text_backed!(VisitStatus);
    text_backed!(ResetStatus);

    pub(crate) use text_backed;
}

#[cfg(feature = "postgres")]
pub(crate) use postgres::text_backed;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        assert!(VisitStatus::Pending.may_become(VisitStatus::Approved));
        assert!(VisitStatus::Pending.may_become(VisitStatus::Rejected));
        assert!(VisitStatus::Approved.may_become(VisitStatus::CheckedIn));
        assert!(VisitStatus::CheckedIn.may_become(VisitStatus::CheckedOut));
    }

    #[test]
    fn test_every_other_transition_is_illegal() {
        let legal = [
            (VisitStatus::Pending, VisitStatus::Approved),
            (VisitStatus::Pending, VisitStatus::Rejected),
            (VisitStatus::Approved, VisitStatus::CheckedIn),
            (VisitStatus::CheckedIn, VisitStatus::CheckedOut),
        ];

        for from in VisitStatus::ALL {
            for to in VisitStatus::ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(from.may_become(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_single_predecessor_per_target() {
        assert_eq!(VisitStatus::predecessor(VisitStatus::Pending), None);
        assert_eq!(
            VisitStatus::predecessor(VisitStatus::Approved),
            Some(VisitStatus::Pending)
        );
        assert_eq!(
            VisitStatus::predecessor(VisitStatus::Rejected),
            Some(VisitStatus::Pending)
        );
        assert_eq!(
            VisitStatus::predecessor(VisitStatus::CheckedIn),
            Some(VisitStatus::Approved)
        );
        assert_eq!(
            VisitStatus::predecessor(VisitStatus::CheckedOut),
            Some(VisitStatus::CheckedIn)
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(VisitStatus::Rejected.is_terminal());
        assert!(VisitStatus::CheckedOut.is_terminal());
        assert!(!VisitStatus::Pending.is_terminal());
        assert!(!VisitStatus::Approved.is_terminal());
        assert!(!VisitStatus::CheckedIn.is_terminal());
    }

    #[test]
    fn test_actions_agree_with_machine() {
        for action in [VisitAction::CheckIn, VisitAction::CheckOut] {
            assert!(action
                .required_status()
                .may_become(action.resulting_status()));
            assert_eq!(
                VisitStatus::predecessor(action.resulting_status()),
                Some(action.required_status())
            );
        }
    }

    #[test]
    fn test_denial_messages() {
        assert_eq!(
            VisitAction::CheckIn.denial(VisitStatus::CheckedIn),
            "Visitor already checked in."
        );
        assert_eq!(
            VisitAction::CheckIn.denial(VisitStatus::CheckedOut),
            "Visitor pass already used (checked out)."
        );
        assert_eq!(
            VisitAction::CheckIn.denial(VisitStatus::Pending),
            "Cannot check in. Visitor status is 'pending'."
        );
        assert_eq!(
            VisitAction::CheckOut.denial(VisitStatus::CheckedOut),
            "Visitor already checked out."
        );
        assert_eq!(
            VisitAction::CheckOut.denial(VisitStatus::Approved),
            "Visitor has not checked in yet."
        );
        assert_eq!(
            VisitAction::CheckOut.denial(VisitStatus::Rejected),
            "Cannot check out. Visitor status is 'rejected'."
        );
    }

    #[test]
    fn test_parse_display_roundtrip() {
        for status in VisitStatus::ALL {
            let parsed: VisitStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("checked-in".parse::<VisitStatus>().is_err());

        let parsed: ResetStatus = "completed".parse().unwrap();
        assert_eq!(parsed, ResetStatus::Completed);
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&VisitStatus::CheckedIn).unwrap(),
            "\"checked_in\""
        );
        assert_eq!(
            serde_json::from_str::<VisitStatus>("\"checked_out\"").unwrap(),
            VisitStatus::CheckedOut
        );
    }
}
