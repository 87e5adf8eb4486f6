//! Coupon entity.
//!
//! # Invariants
//!
//! - `code` is unique across all coupons
//! - `usage_count <= usage_limit` when a limit is set
//! - A coupon whose count reaches its limit is deactivated in the same write
//! - Coupons are never deleted, only deactivated

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CouponId, CourseId, Timestamp};

use super::{CouponCode, DiscountPercent};

/// Why a coupon can or cannot be redeemed right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponAvailability {
    Redeemable,
    Inactive,
    Expired,
    Exhausted,
}

impl CouponAvailability {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponAvailability::Redeemable => "redeemable",
            CouponAvailability::Inactive => "inactive",
            CouponAvailability::Expired => "expired",
            CouponAvailability::Exhausted => "exhausted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: CouponCode,
    pub percent_off: DiscountPercent,

    /// `None` applies to every course.
    pub course_id: Option<CourseId>,

    pub expires_at: Option<Timestamp>,
    pub is_active: bool,
    pub usage_count: i32,

    /// `None` means unlimited redemptions.
    pub usage_limit: Option<i32>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Coupon {
    /// Creates an active, unused coupon.
    pub fn new(
        code: CouponCode,
        percent_off: DiscountPercent,
        course_id: Option<CourseId>,
        expires_at: Option<Timestamp>,
        usage_limit: Option<i32>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: CouponId::new(),
            code,
            percent_off,
            course_id,
            expires_at,
            is_active: true,
            usage_count: 0,
            usage_limit,
            created_at: now,
            updated_at: now,
        }
    }

    /// Course-scoped coupons only match their own course.
    pub fn applies_to(&self, course_id: &CourseId) -> bool {
        self.course_id.map_or(true, |scope| &scope == course_id)
    }

    pub fn is_expired(&self, now: &Timestamp) -> bool {
        self.expires_at.map_or(false, |at| !at.is_after(now))
    }

    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .map_or(false, |limit| self.usage_count >= limit)
    }

    pub fn availability(&self, now: &Timestamp) -> CouponAvailability {
        if !self.is_active {
            CouponAvailability::Inactive
        } else if self.is_expired(now) {
            CouponAvailability::Expired
        } else if self.is_exhausted() {
            CouponAvailability::Exhausted
        } else {
            CouponAvailability::Redeemable
        }
    }

    pub fn is_redeemable(&self, now: &Timestamp) -> bool {
        self.availability(now) == CouponAvailability::Redeemable
    }

    /// Consumes one use, deactivating the coupon when it hits its limit.
    ///
    /// Returns `false` and leaves the coupon untouched if it was not
    /// redeemable. Stores must apply this as one atomic conditional write.
    pub fn redeem(&mut self, now: Timestamp) -> bool {
        if !self.is_redeemable(&now) {
            return false;
        }

        self.usage_count += 1;
        if self.is_exhausted() {
            self.is_active = false;
        }
        self.updated_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coupon(limit: Option<i32>) -> Coupon {
        Coupon::new(
            CouponCode::try_new("SAVE20").unwrap(),
            DiscountPercent::try_new(20).unwrap(),
            None,
            None,
            limit,
        )
    }

    #[test]
    fn new_coupon_is_redeemable() {
        assert!(coupon(Some(5)).is_redeemable(&Timestamp::now()));
    }

    #[test]
    fn global_coupon_applies_to_any_course() {
        assert!(coupon(None).applies_to(&CourseId::new()));
    }

    #[test]
    fn scoped_coupon_applies_only_to_its_course() {
        let course = CourseId::new();
        let mut c = coupon(None);
        c.course_id = Some(course);

        assert!(c.applies_to(&course));
        assert!(!c.applies_to(&CourseId::new()));
    }

    #[test]
    fn expiry_in_the_past_is_expired() {
        let now = Timestamp::now();
        let mut c = coupon(None);
        c.expires_at = Some(now.minus_minutes(1));

        assert_eq!(c.availability(&now), CouponAvailability::Expired);
    }

    #[test]
    fn expiry_in_the_future_is_fine() {
        let now = Timestamp::now();
        let mut c = coupon(None);
        c.expires_at = Some(now.plus_days(1));

        assert!(c.is_redeemable(&now));
    }

    #[test]
    fn inactive_takes_precedence_over_other_reasons() {
        let now = Timestamp::now();
        let mut c = coupon(Some(1));
        c.is_active = false;
        c.usage_count = 1;
        c.expires_at = Some(now.minus_minutes(1));

        assert_eq!(c.availability(&now), CouponAvailability::Inactive);
    }

    #[test]
    fn redeem_at_limit_deactivates() {
        let mut c = coupon(Some(1));

        assert!(c.redeem(Timestamp::now()));
        assert_eq!(c.usage_count, 1);
        assert!(!c.is_active);
    }

    #[test]
    fn redeem_below_limit_keeps_active() {
        let mut c = coupon(Some(3));

        assert!(c.redeem(Timestamp::now()));
        assert_eq!(c.usage_count, 1);
        assert!(c.is_active);
    }

    #[test]
    fn unlimited_coupon_never_exhausts() {
        let mut c = coupon(None);
        for _ in 0..100 {
            assert!(c.redeem(Timestamp::now()));
        }
        assert!(c.is_active);
        assert_eq!(c.usage_count, 100);
    }

    #[test]
    fn redeem_refuses_exhausted_coupon_without_mutating() {
        let mut c = coupon(Some(1));
        c.redeem(Timestamp::now());
        let snapshot = c.clone();

        assert!(!c.redeem(Timestamp::now()));
        assert_eq!(c, snapshot);
    }

    #[test]
    fn availability_strings_are_snake_case() {
        assert_eq!(CouponAvailability::Exhausted.as_str(), "exhausted");
        assert_eq!(
            serde_json::to_string(&CouponAvailability::Inactive).unwrap(),
            "\"inactive\""
        );
    }
}
