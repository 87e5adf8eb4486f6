//! Course as seen by checkout.
//!
//! The catalog owns courses; checkout only reads price, currency and
//! publication state, and bumps the enrollment counter after a payment.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, Money};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub price: Money,
    pub is_published: bool,

    /// Denormalized count of paid enrollments. Eventually consistent.
    pub enrollment_count: i64,
}

impl Course {
    /// Only published courses can be bought.
    pub fn is_purchasable(&self) -> bool {
        self.is_published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Currency;

    #[test]
    fn unpublished_course_is_not_purchasable() {
        let course = Course {
            id: CourseId::new(),
            title: "Draft".to_string(),
            price: Money::new(1999, Currency::inr()).unwrap(),
            is_published: false,
            enrollment_count: 0,
        };

        assert!(!course.is_purchasable());
    }
}
