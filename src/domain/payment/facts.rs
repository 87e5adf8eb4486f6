//! Facts about a captured payment, independent of how we learned them.
//!
//! Both the webhook path and the client confirmation path reduce to a
//! [`CapturedPayment`] before touching the enrollment store.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, Money, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFacts {
    pub amount: Money,
    pub method: Option<String>,
    pub gateway_order_id: Option<String>,
    pub transaction_id: String,
    pub captured_at: Timestamp,
}

/// A payment attributed to a `(user, course)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPayment {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub facts: PaymentFacts,
}
