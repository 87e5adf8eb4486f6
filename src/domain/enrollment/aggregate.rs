//! Enrollment aggregate.
//!
//! The canonical record of "user U bought course C".
//!
//! # Invariants
//!
//! - At most one enrollment per `(user_id, course_id)`, enforced by the store
//! - `payment.paid_at` is set iff status is active or completed
//! - `paid_at` and `enrolled_at` keep the first confirmation's time
//! - Status never moves back from active/completed

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CourseId, DomainError, EnrollmentId, ErrorCode, Money, StateMachine, Timestamp, UserId,
};
use crate::domain::payment::PaymentFacts;

use super::{EnrollmentStatus, LegacyEnrollmentEntry};

/// What the gateway was asked to charge for this enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOrder {
    pub gateway_order_id: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub amount: Money,
    pub method: Option<String>,
    pub gateway_order_id: Option<String>,
    pub transaction_id: Option<String>,
    pub paid_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed_lessons: i32,
    pub percent: i16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub status: EnrollmentStatus,
    pub payment: PaymentRecord,
    pub progress: Progress,

    /// First time the enrollment became active.
    pub enrolled_at: Option<Timestamp>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Enrollment {
    /// A new pending enrollment for a freshly issued gateway order.
    pub fn open_pending(user_id: UserId, course_id: CourseId, order: PendingOrder) -> Self {
        let now = Timestamp::now();
        Self {
            id: EnrollmentId::new(),
            user_id,
            course_id,
            status: EnrollmentStatus::Pending,
            payment: PaymentRecord {
                amount: order.amount,
                method: None,
                gateway_order_id: Some(order.gateway_order_id),
                transaction_id: None,
                paid_at: None,
            },
            progress: Progress::default(),
            enrolled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// An active enrollment for a payment that arrived with no prior row.
    pub fn from_payment(user_id: UserId, course_id: CourseId, facts: &PaymentFacts) -> Self {
        let now = Timestamp::now();
        Self {
            id: EnrollmentId::new(),
            user_id,
            course_id,
            status: EnrollmentStatus::Active,
            payment: PaymentRecord {
                amount: facts.amount.clone(),
                method: facts.method.clone(),
                gateway_order_id: facts.gateway_order_id.clone(),
                transaction_id: Some(facts.transaction_id.clone()),
                paid_at: Some(facts.captured_at),
            },
            progress: Progress::default(),
            enrolled_at: Some(facts.captured_at),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_enrolled(&self) -> bool {
        self.status.is_enrolled()
    }

    /// True if this row was opened for the given gateway order.
    pub fn belongs_to_order(&self, gateway_order_id: &str) -> bool {
        self.payment.gateway_order_id.as_deref() == Some(gateway_order_id)
    }

    /// Points a pending or abandoned enrollment at a new gateway order.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyEnrolled` if the enrollment is already paid.
    pub fn reopen(&mut self, order: PendingOrder) -> Result<(), DomainError> {
        if self.is_enrolled() {
            return Err(DomainError::new(
                ErrorCode::AlreadyEnrolled,
                format!("User {} is already enrolled in course {}", self.user_id, self.course_id),
            ));
        }
        self.transition_to(EnrollmentStatus::Pending)?;
        self.payment = PaymentRecord {
            amount: order.amount,
            method: None,
            gateway_order_id: Some(order.gateway_order_id),
            transaction_id: None,
            paid_at: None,
        };
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Applies a confirmed payment.
    ///
    /// Payment fields are overwritten with the latest facts, except that the
    /// first `paid_at` and `enrolled_at` are kept and a missing method does
    /// not erase a known one. Completed stays completed.
    ///
    /// Returns `true` if this call moved the enrollment into active.
    pub fn confirm_payment(&mut self, facts: &PaymentFacts) -> Result<bool, DomainError> {
        let newly_activated = !self.is_enrolled();
        let target = match self.status {
            EnrollmentStatus::Completed => EnrollmentStatus::Completed,
            _ => EnrollmentStatus::Active,
        };
        self.transition_to(target)?;

        self.payment.amount = facts.amount.clone();
        if facts.method.is_some() {
            self.payment.method = facts.method.clone();
        }
        if facts.gateway_order_id.is_some() {
            self.payment.gateway_order_id = facts.gateway_order_id.clone();
        }
        self.payment.transaction_id = Some(facts.transaction_id.clone());
        self.payment.paid_at.get_or_insert(facts.captured_at);
        self.enrolled_at.get_or_insert(facts.captured_at);
        self.updated_at = Timestamp::now();

        Ok(newly_activated)
    }

    /// Cancels a pending enrollment last touched before `cutoff`.
    ///
    /// Returns `true` if the enrollment was cancelled.
    pub fn cancel_if_abandoned(&mut self, cutoff: &Timestamp) -> bool {
        if self.status != EnrollmentStatus::Pending || !self.updated_at.is_before(cutoff) {
            return false;
        }
        self.status = EnrollmentStatus::Cancelled;
        self.updated_at = Timestamp::now();
        true
    }

    /// The entry this enrollment should have in the user's legacy list.
    pub fn legacy_entry(&self) -> LegacyEnrollmentEntry {
        LegacyEnrollmentEntry {
            course_id: self.course_id,
            enrolled_at: self.enrolled_at.unwrap_or(self.updated_at),
            progress: self.progress.percent,
        }
    }

    fn transition_to(&mut self, target: EnrollmentStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition enrollment from {:?} to {:?}",
                    self.status, target
                ),
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Currency;

    fn user() -> UserId {
        UserId::new("user-123").unwrap()
    }

    fn order(id: &str, amount: i64) -> PendingOrder {
        PendingOrder {
            gateway_order_id: id.to_string(),
            amount: Money::new(amount, Currency::inr()).unwrap(),
        }
    }

    fn facts(txn: &str, method: Option<&str>, at: Timestamp) -> PaymentFacts {
        PaymentFacts {
            amount: Money::new(1599, Currency::inr()).unwrap(),
            method: method.map(str::to_string),
            gateway_order_id: Some("order_1".to_string()),
            transaction_id: txn.to_string(),
            captured_at: at,
        }
    }

    // Construction

    #[test]
    fn open_pending_has_no_payment_time() {
        let e = Enrollment::open_pending(user(), CourseId::new(), order("order_1", 1599));

        assert_eq!(e.status, EnrollmentStatus::Pending);
        assert!(e.payment.paid_at.is_none());
        assert!(e.enrolled_at.is_none());
        assert!(e.belongs_to_order("order_1"));
    }

    #[test]
    fn from_payment_is_active_with_paid_at() {
        let at = Timestamp::now();
        let e = Enrollment::from_payment(user(), CourseId::new(), &facts("pay_1", None, at));

        assert_eq!(e.status, EnrollmentStatus::Active);
        assert_eq!(e.payment.paid_at, Some(at));
        assert_eq!(e.enrolled_at, Some(at));
    }

    // Confirmation

    #[test]
    fn confirm_activates_pending() {
        let mut e = Enrollment::open_pending(user(), CourseId::new(), order("order_1", 1599));
        let at = Timestamp::now();

        let newly = e.confirm_payment(&facts("pay_1", Some("card"), at)).unwrap();

        assert!(newly);
        assert_eq!(e.status, EnrollmentStatus::Active);
        assert_eq!(e.payment.paid_at, Some(at));
        assert_eq!(e.payment.transaction_id.as_deref(), Some("pay_1"));
        assert_eq!(e.payment.method.as_deref(), Some("card"));
    }

    #[test]
    fn repeated_confirm_is_not_newly_activated_and_keeps_first_paid_at() {
        let mut e = Enrollment::open_pending(user(), CourseId::new(), order("order_1", 1599));
        let first = Timestamp::now();
        let later = first.plus_days(1);

        e.confirm_payment(&facts("pay_1", Some("upi"), first)).unwrap();
        let newly = e.confirm_payment(&facts("pay_1", None, later)).unwrap();

        assert!(!newly);
        assert_eq!(e.payment.paid_at, Some(first));
        assert_eq!(e.enrolled_at, Some(first));
        assert_eq!(e.payment.method.as_deref(), Some("upi"));
    }

    #[test]
    fn confirm_keeps_completed() {
        let mut e = Enrollment::open_pending(user(), CourseId::new(), order("order_1", 1599));
        e.confirm_payment(&facts("pay_1", None, Timestamp::now())).unwrap();
        e.status = EnrollmentStatus::Completed;

        let newly = e.confirm_payment(&facts("pay_1", None, Timestamp::now())).unwrap();

        assert!(!newly);
        assert_eq!(e.status, EnrollmentStatus::Completed);
    }

    #[test]
    fn confirm_activates_cancelled() {
        let mut e = Enrollment::open_pending(user(), CourseId::new(), order("order_1", 1599));
        e.status = EnrollmentStatus::Cancelled;

        assert!(e.confirm_payment(&facts("pay_1", None, Timestamp::now())).unwrap());
        assert_eq!(e.status, EnrollmentStatus::Active);
    }

    // Reopen

    #[test]
    fn reopen_replaces_order_on_cancelled() {
        let mut e = Enrollment::open_pending(user(), CourseId::new(), order("order_1", 1999));
        e.status = EnrollmentStatus::Cancelled;

        e.reopen(order("order_2", 1599)).unwrap();

        assert_eq!(e.status, EnrollmentStatus::Pending);
        assert!(e.belongs_to_order("order_2"));
        assert_eq!(e.payment.amount.amount_minor(), 1599);
    }

    #[test]
    fn reopen_refuses_active() {
        let mut e = Enrollment::open_pending(user(), CourseId::new(), order("order_1", 1599));
        e.confirm_payment(&facts("pay_1", None, Timestamp::now())).unwrap();

        let err = e.reopen(order("order_2", 1599)).unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyEnrolled);
        assert!(e.belongs_to_order("order_1"));
    }

    // Abandonment

    #[test]
    fn stale_pending_is_cancelled() {
        let mut e = Enrollment::open_pending(user(), CourseId::new(), order("order_1", 1599));
        let cutoff = Timestamp::now().plus_days(1);

        assert!(e.cancel_if_abandoned(&cutoff));
        assert_eq!(e.status, EnrollmentStatus::Cancelled);
    }

    #[test]
    fn fresh_pending_is_kept() {
        let mut e = Enrollment::open_pending(user(), CourseId::new(), order("order_1", 1599));
        let cutoff = Timestamp::now().minus_minutes(60);

        assert!(!e.cancel_if_abandoned(&cutoff));
        assert_eq!(e.status, EnrollmentStatus::Pending);
    }

    #[test]
    fn active_is_never_abandoned() {
        let mut e = Enrollment::open_pending(user(), CourseId::new(), order("order_1", 1599));
        e.confirm_payment(&facts("pay_1", None, Timestamp::now())).unwrap();

        assert!(!e.cancel_if_abandoned(&Timestamp::now().plus_days(30)));
    }

    #[test]
    fn legacy_entry_uses_enrollment_time() {
        let at = Timestamp::now();
        let course = CourseId::new();
        let e = Enrollment::from_payment(user(), course, &facts("pay_1", None, at));

        let entry = e.legacy_entry();
        assert_eq!(entry.course_id, course);
        assert_eq!(entry.enrolled_at, at);
        assert_eq!(entry.progress, 0);
    }
}
