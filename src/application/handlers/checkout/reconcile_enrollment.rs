//! EnrollmentReconciler - Applies a confirmed payment to every store.
//!
//! Shared by the webhook and the client-side confirmation, which can race
//! for the same payment. The canonical upsert is the only step that can
//! fail the call; the legacy mirror, the course counter and the
//! notification are best-effort and run after it.

use std::sync::Arc;

use crate::domain::enrollment::EnrollmentConfirmed;
use crate::domain::foundation::{CourseId, DomainError, EventEnvelope, EventId, Timestamp, UserId};
use crate::domain::payment::PaymentFacts;
use crate::ports::{
    CourseCatalog, EnrollmentRepository, EventPublisher, LegacyEnrollmentMirror, ReconcileOutcome,
};

pub struct EnrollmentReconciler {
    enrollments: Arc<dyn EnrollmentRepository>,
    legacy_mirror: Arc<dyn LegacyEnrollmentMirror>,
    catalog: Arc<dyn CourseCatalog>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl EnrollmentReconciler {
    pub fn new(
        enrollments: Arc<dyn EnrollmentRepository>,
        legacy_mirror: Arc<dyn LegacyEnrollmentMirror>,
        catalog: Arc<dyn CourseCatalog>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            enrollments,
            legacy_mirror,
            catalog,
            event_publisher,
        }
    }

    /// Records the payment and fans out the side effects.
    ///
    /// Safe to call any number of times for the same payment: only the call
    /// that activates the enrollment bumps the counter and notifies.
    pub async fn reconcile(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        facts: &PaymentFacts,
    ) -> Result<ReconcileOutcome, DomainError> {
        let outcome = self
            .enrollments
            .reconcile_payment(user_id, course_id, facts)
            .await?;
        let enrollment = &outcome.enrollment;

        tracing::info!(
            enrollment_id = %enrollment.id,
            user_id = %user_id,
            course_id = %course_id,
            transaction_id = %facts.transaction_id,
            status = %enrollment.status,
            newly_activated = outcome.newly_activated,
            "Enrollment reconciled"
        );

        if let Err(e) = self
            .legacy_mirror
            .ensure_entry(user_id, &enrollment.legacy_entry())
            .await
        {
            tracing::warn!(
                user_id = %user_id,
                course_id = %course_id,
                error = %e,
                "Legacy enrollment mirror failed"
            );
        }

        if !outcome.newly_activated {
            return Ok(outcome);
        }

        let course_title = match self.catalog.find_course(course_id).await {
            Ok(course) => course.map(|c| c.title),
            Err(e) => {
                tracing::warn!(course_id = %course_id, error = %e, "Course lookup failed");
                None
            }
        };

        if let Err(e) = self.catalog.increment_enrollment_count(course_id).await {
            tracing::warn!(course_id = %course_id, error = %e, "Enrollment counter increment failed");
        }

        self.notify(&outcome, facts, course_title).await;

        Ok(outcome)
    }

    async fn notify(&self, outcome: &ReconcileOutcome, facts: &PaymentFacts, course_title: Option<String>) {
        let enrollment = &outcome.enrollment;
        let event = EnrollmentConfirmed {
            event_id: EventId::new(),
            enrollment_id: enrollment.id,
            user_id: enrollment.user_id.clone(),
            course_id: enrollment.course_id,
            course_title,
            amount_minor: facts.amount.amount_minor(),
            currency: facts.amount.currency().as_str().to_string(),
            transaction_id: facts.transaction_id.clone(),
            confirmed_at: Timestamp::now(),
        };

        let envelope = match EventEnvelope::from_event(&event) {
            Ok(envelope) => envelope
                .with_user_id(enrollment.user_id.as_str())
                .with_correlation_id(facts.transaction_id.clone()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build enrollment notification");
                return;
            }
        };

        if let Err(e) = self.event_publisher.publish(envelope).await {
            tracing::warn!(
                enrollment_id = %enrollment.id,
                error = %e,
                "Enrollment notification not delivered"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{
        InMemoryCourseCatalog, InMemoryEnrollmentRepository, InMemoryLegacyMirror,
    };
    use crate::domain::course::Course;
    use crate::domain::enrollment::{EnrollmentStatus, LegacyEnrollmentEntry, MirrorOutcome};
    use crate::domain::foundation::{Currency, ErrorCode, Money};
    use async_trait::async_trait;

    struct BrokenMirror;

    #[async_trait]
    impl LegacyEnrollmentMirror for BrokenMirror {
        async fn ensure_entry(
            &self,
            _user_id: &UserId,
            _entry: &LegacyEnrollmentEntry,
        ) -> Result<MirrorOutcome, DomainError> {
            Err(DomainError::database("users table locked"))
        }
    }

    struct Fixture {
        reconciler: EnrollmentReconciler,
        enrollments: Arc<InMemoryEnrollmentRepository>,
        mirror: Arc<InMemoryLegacyMirror>,
        catalog: Arc<InMemoryCourseCatalog>,
        bus: Arc<InMemoryEventBus>,
        course: Course,
    }

    fn fixture_with(mirror_impl: Option<Arc<dyn LegacyEnrollmentMirror>>, bus: InMemoryEventBus) -> Fixture {
        let course = Course {
            id: CourseId::new(),
            title: "Rust Concurrency".to_string(),
            price: Money::new(1999, Currency::inr()).unwrap(),
            is_published: true,
            enrollment_count: 0,
        };
        let enrollments = Arc::new(InMemoryEnrollmentRepository::new());
        let mirror = Arc::new(InMemoryLegacyMirror::new());
        let catalog = Arc::new(InMemoryCourseCatalog::new().with_course(course.clone()));
        let bus = Arc::new(bus);
        let reconciler = EnrollmentReconciler::new(
            enrollments.clone(),
            mirror_impl.unwrap_or_else(|| mirror.clone() as Arc<dyn LegacyEnrollmentMirror>),
            catalog.clone(),
            bus.clone(),
        );
        Fixture {
            reconciler,
            enrollments,
            mirror,
            catalog,
            bus,
            course,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(None, InMemoryEventBus::new())
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn facts(txn: &str) -> PaymentFacts {
        PaymentFacts {
            amount: Money::new(1599, Currency::inr()).unwrap(),
            method: Some("card".to_string()),
            gateway_order_id: Some("order_1".to_string()),
            transaction_id: txn.to_string(),
            captured_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn first_reconcile_fans_out_once() {
        let f = fixture();

        let outcome = f
            .reconciler
            .reconcile(&user(), &f.course.id, &facts("pay_1"))
            .await
            .unwrap();

        assert!(outcome.newly_activated);
        assert_eq!(outcome.enrollment.status, EnrollmentStatus::Active);
        assert_eq!(f.mirror.entries(&user()).len(), 1);
        assert_eq!(f.catalog.enrollment_count(&f.course.id), Some(1));
        assert_eq!(f.bus.events_of_type("enrollment.confirmed.v1").len(), 1);
    }

    #[tokio::test]
    async fn duplicate_reconcile_does_not_repeat_side_effects() {
        let f = fixture();

        f.reconciler.reconcile(&user(), &f.course.id, &facts("pay_1")).await.unwrap();
        let second = f
            .reconciler
            .reconcile(&user(), &f.course.id, &facts("pay_1"))
            .await
            .unwrap();

        assert!(!second.newly_activated);
        assert_eq!(f.enrollments.len(), 1);
        assert_eq!(f.mirror.entries(&user()).len(), 1);
        assert_eq!(f.catalog.enrollment_count(&f.course.id), Some(1));
        assert_eq!(f.bus.event_count(), 1);
    }

    #[tokio::test]
    async fn notification_carries_course_title_and_amount() {
        let f = fixture();
        f.reconciler.reconcile(&user(), &f.course.id, &facts("pay_7")).await.unwrap();

        let envelope = &f.bus.published_events()[0];
        let event: EnrollmentConfirmed = envelope.payload_as().unwrap();
        assert_eq!(event.course_title.as_deref(), Some("Rust Concurrency"));
        assert_eq!(event.amount_minor, 1599);
        assert_eq!(event.transaction_id, "pay_7");
        assert_eq!(envelope.metadata.user_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn mirror_failure_is_not_fatal() {
        let f = fixture_with(Some(Arc::new(BrokenMirror)), InMemoryEventBus::new());

        let outcome = f
            .reconciler
            .reconcile(&user(), &f.course.id, &facts("pay_1"))
            .await
            .unwrap();

        assert!(outcome.newly_activated);
        assert_eq!(f.catalog.enrollment_count(&f.course.id), Some(1));
    }

    #[tokio::test]
    async fn notification_failure_is_not_fatal() {
        let f = fixture_with(None, InMemoryEventBus::failing());

        let outcome = f
            .reconciler
            .reconcile(&user(), &f.course.id, &facts("pay_1"))
            .await;

        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn unknown_course_still_records_enrollment() {
        let f = fixture();
        let other = CourseId::new();

        let outcome = f.reconciler.reconcile(&user(), &other, &facts("pay_1")).await.unwrap();

        assert!(outcome.newly_activated);
        let stored = f.enrollments.find_by_user_and_course(&user(), &other).await.unwrap();
        assert!(stored.is_some());
        let event: EnrollmentConfirmed = f.bus.published_events()[0].payload_as().unwrap();
        assert!(event.course_title.is_none());
    }

    #[tokio::test]
    async fn store_failure_surfaces() {
        struct DownStore;

        #[async_trait]
        impl EnrollmentRepository for DownStore {
            async fn find_by_user_and_course(
                &self,
                _: &UserId,
                _: &CourseId,
            ) -> Result<Option<crate::domain::enrollment::Enrollment>, DomainError> {
                Err(DomainError::database("down"))
            }
            async fn open_pending(
                &self,
                _: &UserId,
                _: &CourseId,
                _: crate::domain::enrollment::PendingOrder,
            ) -> Result<crate::ports::OpenPendingOutcome, DomainError> {
                Err(DomainError::database("down"))
            }
            async fn reconcile_payment(
                &self,
                _: &UserId,
                _: &CourseId,
                _: &PaymentFacts,
            ) -> Result<ReconcileOutcome, DomainError> {
                Err(DomainError::database("down"))
            }
            async fn cancel_abandoned(&self, _: Timestamp) -> Result<u64, DomainError> {
                Err(DomainError::database("down"))
            }
        }

        let bus = Arc::new(InMemoryEventBus::new());
        let reconciler = EnrollmentReconciler::new(
            Arc::new(DownStore),
            Arc::new(InMemoryLegacyMirror::new()),
            Arc::new(InMemoryCourseCatalog::new()),
            bus.clone(),
        );

        let err = reconciler
            .reconcile(&user(), &CourseId::new(), &facts("pay_1"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(bus.event_count(), 0);
    }
}
