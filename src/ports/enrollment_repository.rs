//! Enrollment repository port.
//!
//! The canonical enrollment store. Every write is keyed by
//! `(user_id, course_id)` and must be a single atomic upsert, so concurrent
//! orders, client confirmations and webhook redeliveries converge on one row.

use async_trait::async_trait;

use crate::domain::enrollment::{Enrollment, PendingOrder};
use crate::domain::foundation::{CourseId, DomainError, Timestamp, UserId};
use crate::domain::payment::PaymentFacts;

/// Result of opening a pending enrollment for a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenPendingOutcome {
    /// Row created, or an existing pending/cancelled row re-pointed at the new order.
    Opened(Enrollment),

    /// The pair is already paid; the existing row is returned untouched.
    AlreadyEnrolled(Enrollment),
}

/// Result of applying a confirmed payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub enrollment: Enrollment,

    /// True only for the single call that moved the row into active.
    /// Side effects that must happen once (counter, notification) key off this.
    pub newly_activated: bool,
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn find_by_user_and_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, DomainError>;

    /// Upserts a pending enrollment for a freshly created gateway order.
    async fn open_pending(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        order: PendingOrder,
    ) -> Result<OpenPendingOutcome, DomainError>;

    /// Upserts the enrollment as paid.
    ///
    /// Creates the row if missing. Pending and cancelled rows become active,
    /// completed stays completed. The first `paid_at` is kept.
    async fn reconcile_payment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        facts: &PaymentFacts,
    ) -> Result<ReconcileOutcome, DomainError>;

    /// Cancels pending enrollments not touched since `cutoff`.
    ///
    /// Returns how many rows were cancelled.
    async fn cancel_abandoned(&self, cutoff: Timestamp) -> Result<u64, DomainError>;
}
