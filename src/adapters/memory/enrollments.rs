use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::enrollment::{Enrollment, PendingOrder};
use crate::domain::foundation::{CourseId, DomainError, Timestamp, UserId};
use crate::domain::payment::PaymentFacts;
use crate::ports::{EnrollmentRepository, OpenPendingOutcome, ReconcileOutcome};

use super::poisoned;

type Key = (UserId, CourseId);

/// Enrollment store keyed by `(user_id, course_id)`.
///
/// The map key is the uniqueness constraint; every operation holds the lock
/// for its whole read-modify-write.
#[derive(Default)]
pub struct InMemoryEnrollmentRepository {
    rows: Mutex<HashMap<Key, Enrollment>>,
}

impl InMemoryEnrollmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, enrollment: Enrollment) {
        if let Ok(mut rows) = self.rows.lock() {
            rows.insert(
                (enrollment.user_id.clone(), enrollment.course_id),
                enrollment,
            );
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Backdates a row's `updated_at`, for sweep tests.
    pub fn touch(&self, user_id: &UserId, course_id: &CourseId, updated_at: Timestamp) {
        if let Ok(mut rows) = self.rows.lock() {
            if let Some(row) = rows.get_mut(&(user_id.clone(), *course_id)) {
                row.updated_at = updated_at;
            }
        }
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryEnrollmentRepository {
    async fn find_by_user_and_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, DomainError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.get(&(user_id.clone(), *course_id)).cloned())
    }

    async fn open_pending(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        order: PendingOrder,
    ) -> Result<OpenPendingOutcome, DomainError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let key = (user_id.clone(), *course_id);

        match rows.get_mut(&key) {
            Some(existing) if existing.is_enrolled() => {
                Ok(OpenPendingOutcome::AlreadyEnrolled(existing.clone()))
            }
            Some(existing) => {
                existing.reopen(order)?;
                Ok(OpenPendingOutcome::Opened(existing.clone()))
            }
            None => {
                let enrollment = Enrollment::open_pending(user_id.clone(), *course_id, order);
                rows.insert(key, enrollment.clone());
                Ok(OpenPendingOutcome::Opened(enrollment))
            }
        }
    }

    async fn reconcile_payment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        facts: &PaymentFacts,
    ) -> Result<ReconcileOutcome, DomainError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let key = (user_id.clone(), *course_id);

        match rows.get_mut(&key) {
            Some(existing) => {
                let newly_activated = existing.confirm_payment(facts)?;
                Ok(ReconcileOutcome {
                    enrollment: existing.clone(),
                    newly_activated,
                })
            }
            None => {
                let enrollment = Enrollment::from_payment(user_id.clone(), *course_id, facts);
                rows.insert(key, enrollment.clone());
                Ok(ReconcileOutcome {
                    enrollment,
                    newly_activated: true,
                })
            }
        }
    }

    async fn cancel_abandoned(&self, cutoff: Timestamp) -> Result<u64, DomainError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let cancelled = rows
            .values_mut()
            .map(|row| row.cancel_if_abandoned(&cutoff))
            .filter(|cancelled| *cancelled)
            .count();
        Ok(cancelled as u64)
    }
}
