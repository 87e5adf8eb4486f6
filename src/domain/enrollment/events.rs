//! Enrollment domain events.
//!
//! Published to the notification sink after reconciliation. Delivery is
//! best-effort; nothing in checkout waits on a consumer.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CourseId, DomainEvent, EnrollmentId, EventId, Timestamp, UserId,
};

/// A payment moved an enrollment into active for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentConfirmed {
    pub event_id: EventId,
    pub enrollment_id: EnrollmentId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub course_title: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub transaction_id: String,
    pub confirmed_at: Timestamp,
}

impl DomainEvent for EnrollmentConfirmed {
    fn event_type(&self) -> &'static str {
        "enrollment.confirmed.v1"
    }

    fn aggregate_type(&self) -> &'static str {
        "Enrollment"
    }

    fn aggregate_id(&self) -> String {
        self.enrollment_id.to_string()
    }

    fn event_id(&self) -> EventId {
        self.event_id.clone()
    }

    fn occurred_at(&self) -> Timestamp {
        self.confirmed_at
    }
}
