//! ValidateCouponQuery - Read-only coupon check for the checkout page.
//!
//! Nothing is reserved; availability can change before the order is created.

use std::sync::Arc;

use crate::domain::checkout::CheckoutError;
use crate::domain::coupon::{CouponAvailability, CouponCode, DiscountPercent};
use crate::domain::foundation::{CourseId, Timestamp};
use crate::ports::CouponRepository;

#[derive(Debug, Clone)]
pub struct ValidateCouponQuery {
    pub code: CouponCode,
    pub course_id: CourseId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateCouponResult {
    pub code: CouponCode,
    pub percent_off: DiscountPercent,
    pub expires_at: Option<Timestamp>,
}

pub struct ValidateCouponHandler {
    coupons: Arc<dyn CouponRepository>,
}

impl ValidateCouponHandler {
    pub fn new(coupons: Arc<dyn CouponRepository>) -> Self {
        Self { coupons }
    }

    pub async fn handle(&self, query: ValidateCouponQuery) -> Result<ValidateCouponResult, CheckoutError> {
        let coupon = self
            .coupons
            .find_by_code(&query.code)
            .await?
            .filter(|c| c.applies_to(&query.course_id))
            .ok_or_else(|| CheckoutError::coupon_not_found(query.code.as_str()))?;

        match coupon.availability(&Timestamp::now()) {
            CouponAvailability::Redeemable => Ok(ValidateCouponResult {
                code: coupon.code,
                percent_off: coupon.percent_off,
                expires_at: coupon.expires_at,
            }),
            reason => Err(CheckoutError::coupon_unavailable(coupon.code.as_str(), reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCouponRepository;
    use crate::domain::coupon::Coupon;

    fn coupon(course: Option<CourseId>, expires_at: Option<Timestamp>) -> Coupon {
        Coupon::new(
            CouponCode::try_new("SAVE20").unwrap(),
            DiscountPercent::try_new(20).unwrap(),
            course,
            expires_at,
            None,
        )
    }

    fn query(course_id: CourseId) -> ValidateCouponQuery {
        ValidateCouponQuery {
            code: CouponCode::try_new("save20").unwrap(),
            course_id,
        }
    }

    #[tokio::test]
    async fn returns_percent_for_redeemable_coupon() {
        let handler = ValidateCouponHandler::new(Arc::new(
            InMemoryCouponRepository::new().with_coupon(coupon(None, None)),
        ));

        let result = handler.handle(query(CourseId::new())).await.unwrap();

        assert_eq!(result.code.as_str(), "SAVE20");
        assert_eq!(result.percent_off.value(), 20);
        assert!(result.expires_at.is_none());
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let handler = ValidateCouponHandler::new(Arc::new(InMemoryCouponRepository::new()));

        let err = handler.handle(query(CourseId::new())).await.unwrap_err();

        assert!(matches!(err, CheckoutError::CouponNotFound(_)));
    }

    #[tokio::test]
    async fn coupon_scoped_to_other_course_is_not_found() {
        let handler = ValidateCouponHandler::new(Arc::new(
            InMemoryCouponRepository::new().with_coupon(coupon(Some(CourseId::new()), None)),
        ));

        let err = handler.handle(query(CourseId::new())).await.unwrap_err();

        assert!(matches!(err, CheckoutError::CouponNotFound(_)));
    }

    #[tokio::test]
    async fn expired_coupon_reports_reason() {
        let past = Timestamp::now().minus_minutes(5);
        let handler = ValidateCouponHandler::new(Arc::new(
            InMemoryCouponRepository::new().with_coupon(coupon(None, Some(past))),
        ));

        let err = handler.handle(query(CourseId::new())).await.unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::CouponUnavailable {
                reason: CouponAvailability::Expired,
                ..
            }
        ));
    }
}
