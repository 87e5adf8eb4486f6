//! Price quotes.
//!
//! A quote is the nominal course price with at most one discount applied.
//! Computing a quote never consumes the discount; that happens only after
//! the gateway accepts the order.

use serde::Serialize;

use crate::domain::coupon::{apply_percent_off, Coupon, CouponCode, DiscountPercent};
use crate::domain::course::Course;
use crate::domain::foundation::{Money, UserId};
use crate::domain::referral::REFERRAL_DISCOUNT_PERCENT;

/// The single discount instrument on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppliedDiscount {
    Coupon {
        code: CouponCode,
        percent_off: DiscountPercent,
    },
    Referral {
        referrer: UserId,
        percent_off: DiscountPercent,
    },
}

impl AppliedDiscount {
    pub fn percent_off(&self) -> DiscountPercent {
        match self {
            AppliedDiscount::Coupon { percent_off, .. }
            | AppliedDiscount::Referral { percent_off, .. } => *percent_off,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub original: Money,
    pub price: Money,
    pub discount: Option<AppliedDiscount>,
}

impl PriceQuote {
    pub fn full_price(course: &Course) -> Self {
        Self {
            original: course.price.clone(),
            price: course.price.clone(),
            discount: None,
        }
    }

    /// Applies a coupon. The caller has already checked it is redeemable
    /// and scoped to this course.
    pub fn with_coupon(course: &Course, coupon: &Coupon) -> Self {
        Self::discounted(
            course,
            AppliedDiscount::Coupon {
                code: coupon.code.clone(),
                percent_off: coupon.percent_off,
            },
        )
    }

    pub fn with_referral(course: &Course, referrer: UserId) -> Self {
        Self::discounted(
            course,
            AppliedDiscount::Referral {
                referrer,
                percent_off: REFERRAL_DISCOUNT_PERCENT,
            },
        )
    }

    fn discounted(course: &Course, discount: AppliedDiscount) -> Self {
        let amount = apply_percent_off(course.price.amount_minor(), discount.percent_off());
        let price = Money::new(amount, course.price.currency().clone())
            .unwrap_or_else(|_| course.price.clone());
        Self {
            original: course.price.clone(),
            price,
            discount: Some(discount),
        }
    }

    /// Percent taken off, 0 when no discount applies.
    pub fn discount_percent(&self) -> u8 {
        self.discount
            .as_ref()
            .map_or(0, |d| d.percent_off().value())
    }

    pub fn applied_coupon(&self) -> Option<&CouponCode> {
        match &self.discount {
            Some(AppliedDiscount::Coupon { code, .. }) => Some(code),
            _ => None,
        }
    }

    pub fn referrer(&self) -> Option<&UserId> {
        match &self.discount {
            Some(AppliedDiscount::Referral { referrer, .. }) => Some(referrer),
            _ => None,
        }
    }
}
