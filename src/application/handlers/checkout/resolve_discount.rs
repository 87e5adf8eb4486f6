//! DiscountResolver - Quotes and commits the single discount on an order.
//!
//! Quoting is read-only. `commit` consumes the discount through the stores'
//! atomic operations and is only called once the gateway has accepted the
//! order, so a gateway failure never burns a coupon use or a referral.

use std::sync::Arc;

use crate::domain::checkout::{AppliedDiscount, CheckoutError, PriceQuote};
use crate::domain::coupon::CouponCode;
use crate::domain::course::Course;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::referral::{ReferralCode, ReferralRejection};
use crate::ports::{CouponRepository, ReferralRepository};

pub struct DiscountResolver {
    coupons: Arc<dyn CouponRepository>,
    referrals: Arc<dyn ReferralRepository>,
}

impl DiscountResolver {
    pub fn new(coupons: Arc<dyn CouponRepository>, referrals: Arc<dyn ReferralRepository>) -> Self {
        Self { coupons, referrals }
    }

    /// Prices the course for `user_id` with at most one discount.
    ///
    /// A coupon that does not exist, is scoped to another course, or is not
    /// redeemable falls back to the nominal price. Referral problems are
    /// reported, since the buyer asked for a specific benefit.
    pub async fn quote(
        &self,
        course: &Course,
        user_id: &UserId,
        coupon: Option<&CouponCode>,
        referral: Option<&ReferralCode>,
    ) -> Result<PriceQuote, CheckoutError> {
        match (coupon, referral) {
            (Some(_), Some(_)) => Err(CheckoutError::validation(
                "discount",
                "coupon and referral discounts cannot be combined",
            )),
            (Some(code), None) => self.quote_coupon(course, code).await,
            (None, Some(code)) => self.quote_referral(course, user_id, code).await,
            (None, None) => Ok(PriceQuote::full_price(course)),
        }
    }

    async fn quote_coupon(
        &self,
        course: &Course,
        code: &CouponCode,
    ) -> Result<PriceQuote, CheckoutError> {
        let now = Timestamp::now();
        match self.coupons.find_by_code(code).await? {
            Some(coupon) if coupon.applies_to(&course.id) && coupon.is_redeemable(&now) => {
                Ok(PriceQuote::with_coupon(course, &coupon))
            }
            Some(coupon) => {
                tracing::info!(
                    coupon = %code,
                    course_id = %course.id,
                    availability = coupon.availability(&now).as_str(),
                    "Coupon not applicable, charging full price"
                );
                Ok(PriceQuote::full_price(course))
            }
            None => {
                tracing::info!(coupon = %code, "Unknown coupon, charging full price");
                Ok(PriceQuote::full_price(course))
            }
        }
    }

    async fn quote_referral(
        &self,
        course: &Course,
        user_id: &UserId,
        code: &ReferralCode,
    ) -> Result<PriceQuote, CheckoutError> {
        let referrer = self
            .referrals
            .find_by_code(code)
            .await?
            .ok_or_else(|| CheckoutError::validation("referral_code", "unknown referral code"))?;

        // The claim updates the requester's row, so there has to be one.
        let requester = match self.referrals.find_profile(user_id).await? {
            Some(profile) => profile,
            None => {
                tracing::warn!(user_id = %user_id, "Referral requested by user without a profile");
                return Err(CheckoutError::referral_unavailable(
                    "no referral profile for this account",
                ));
            }
        };

        match requester.check_can_redeem(&referrer) {
            Ok(()) => Ok(PriceQuote::with_referral(course, referrer.user_id)),
            Err(ReferralRejection::SelfReferral) => Err(CheckoutError::validation(
                "referral_code",
                "cannot redeem your own referral code",
            )),
            Err(ReferralRejection::AlreadyUsed) => Err(CheckoutError::referral_unavailable(
                "already used",
            )),
        }
    }

    /// Consumes the quoted discount.
    ///
    /// # Errors
    ///
    /// `DiscountLost` if a concurrent order consumed it after quoting.
    pub async fn commit(&self, quote: &PriceQuote, user_id: &UserId) -> Result<(), CheckoutError> {
        match &quote.discount {
            None => Ok(()),
            Some(AppliedDiscount::Coupon { code, .. }) => {
                let coupon = self
                    .coupons
                    .find_by_code(code)
                    .await?
                    .ok_or_else(|| CheckoutError::discount_lost(format!("Coupon '{}'", code)))?;
                match self.coupons.redeem(&coupon.id).await? {
                    Some(redeemed) => {
                        tracing::info!(
                            coupon = %code,
                            usage_count = redeemed.usage_count,
                            usage_limit = ?redeemed.usage_limit,
                            "Coupon redeemed"
                        );
                        Ok(())
                    }
                    None => Err(CheckoutError::discount_lost(format!("Coupon '{}'", code))),
                }
            }
            Some(AppliedDiscount::Referral { referrer, .. }) => {
                if self.referrals.claim(user_id, referrer).await? {
                    tracing::info!(user_id = %user_id, referrer = %referrer, "Referral discount claimed");
                    Ok(())
                } else {
                    Err(CheckoutError::discount_lost("Referral discount"))
                }
            }
        }
    }
}
