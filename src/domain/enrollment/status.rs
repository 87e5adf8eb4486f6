//! Enrollment status state machine.
//!
//! ```text
//! pending ──▶ active ──▶ completed
//!    │  ▲        ▲
//!    ▼  │        │
//! cancelled ─────┘
//! ```
//!
//! Payments always win: a capture arriving for a cancelled (abandoned)
//! enrollment still activates it. Nothing moves back from active or
//! completed.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Order issued, payment not yet confirmed.
    Pending,

    /// Paid; the user has access.
    Active,

    /// Paid and finished.
    Completed,

    /// Abandoned before payment.
    Cancelled,
}

impl EnrollmentStatus {
    /// True once payment has been confirmed.
    pub fn is_enrolled(&self) -> bool {
        matches!(self, EnrollmentStatus::Active | EnrollmentStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EnrollmentStatus::Pending),
            "active" => Ok(EnrollmentStatus::Active),
            "completed" => Ok(EnrollmentStatus::Completed),
            "cancelled" => Ok(EnrollmentStatus::Cancelled),
            other => Err(format!("unknown enrollment status: {}", other)),
        }
    }
}

impl StateMachine for EnrollmentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use EnrollmentStatus::*;
        matches!(
            (self, target),
            (Pending, Pending) // new order for the same pair
                | (Pending, Active)
                | (Pending, Cancelled)
                | (Active, Active) // repeated confirmation
                | (Active, Completed)
                | (Completed, Completed)
                | (Cancelled, Pending)
                | (Cancelled, Active)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use EnrollmentStatus::*;
        match self {
            Pending => vec![Pending, Active, Cancelled],
            Active => vec![Active, Completed],
            Completed => vec![Completed],
            Cancelled => vec![Pending, Active],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use EnrollmentStatus::*;

    const ALL: [EnrollmentStatus; 4] = [Pending, Active, Completed, Cancelled];

    #[test]
    fn only_paid_states_count_as_enrolled() {
        assert!(!Pending.is_enrolled());
        assert!(Active.is_enrolled());
        assert!(Completed.is_enrolled());
        assert!(!Cancelled.is_enrolled());
    }

    #[test]
    fn enrolled_states_never_regress() {
        for from in [Active, Completed] {
            assert!(!from.can_transition_to(&Pending));
            assert!(!from.can_transition_to(&Cancelled));
        }
        assert!(!Completed.can_transition_to(&Active));
    }

    #[test]
    fn late_capture_activates_cancelled() {
        assert!(Cancelled.can_transition_to(&Active));
    }

    #[test]
    fn string_round_trip() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<EnrollmentStatus>(), Ok(status));
        }
        assert!("refunded".parse::<EnrollmentStatus>().is_err());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(&to),
                    from.valid_transitions().contains(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Cancelled).unwrap(), "\"cancelled\"");
    }
}
