//! Coupon repository port.

use async_trait::async_trait;

use crate::domain::coupon::{Coupon, CouponCode};
use crate::domain::foundation::{CouponId, DomainError};

#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>, DomainError>;

    /// Consumes one use of the coupon.
    ///
    /// Must be a single conditional write: it succeeds only while the coupon
    /// is active, unexpired and under its limit, and deactivates the coupon
    /// when the new count reaches the limit. Returns the updated coupon, or
    /// `None` if the coupon was no longer redeemable.
    async fn redeem(&self, id: &CouponId) -> Result<Option<Coupon>, DomainError>;
}
