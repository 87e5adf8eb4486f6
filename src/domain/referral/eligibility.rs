//! Referral eligibility.
//!
//! The discount is course-independent and can be consumed once per user,
//! ever. The flag flips together with `referred_by` and the inviter's
//! counter, in one store operation.

use serde::{Deserialize, Serialize};

use crate::domain::coupon::DiscountPercent;
use crate::domain::foundation::{StateMachine, UserId, ValidationError};

use super::ReferralCode;

/// Percent off granted by redeeming another user's referral code.
pub const REFERRAL_DISCOUNT_PERCENT: DiscountPercent = DiscountPercent::new_const(10);

/// Whether a user's one-time referral discount is still available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralStatus {
    Unused,
    Used,
}

impl StateMachine for ReferralStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!((self, target), (ReferralStatus::Unused, ReferralStatus::Used))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            ReferralStatus::Unused => vec![ReferralStatus::Used],
            ReferralStatus::Used => vec![],
        }
    }
}

/// Reason a referral code cannot be applied for a requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferralRejection {
    SelfReferral,
    AlreadyUsed,
}

/// Referral-related fields of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralProfile {
    pub user_id: UserId,
    pub referral_code: Option<ReferralCode>,
    pub status: ReferralStatus,
    pub referred_by: Option<UserId>,
    pub invite_count: i32,
}

impl ReferralProfile {
    /// A fresh profile with the discount still available.
    pub fn new(user_id: UserId, referral_code: Option<ReferralCode>) -> Self {
        Self {
            user_id,
            referral_code,
            status: ReferralStatus::Unused,
            referred_by: None,
            invite_count: 0,
        }
    }

    pub fn discount_used(&self) -> bool {
        self.status == ReferralStatus::Used
    }

    /// Checks whether `self` may redeem the code owned by `referrer`.
    pub fn check_can_redeem(&self, referrer: &ReferralProfile) -> Result<(), ReferralRejection> {
        if self.user_id == referrer.user_id {
            return Err(ReferralRejection::SelfReferral);
        }
        if self.discount_used() {
            return Err(ReferralRejection::AlreadyUsed);
        }
        Ok(())
    }

    /// Consumes the discount and records who referred this user.
    pub fn claim(&mut self, referrer: UserId) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(ReferralStatus::Used)?;
        self.referred_by = Some(referrer);
        Ok(())
    }

    pub fn record_invite(&mut self) {
        self.invite_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> ReferralProfile {
        ReferralProfile::new(
            UserId::new(id).unwrap(),
            Some(ReferralCode::try_new(&format!("{}CODE", id)).unwrap()),
        )
    }

    #[test]
    fn used_is_terminal() {
        assert!(ReferralStatus::Used.is_terminal());
        assert!(!ReferralStatus::Unused.is_terminal());
    }

    #[test]
    fn fresh_user_can_redeem_someone_elses_code() {
        assert_eq!(profile("bob").check_can_redeem(&profile("alice")), Ok(()));
    }

    #[test]
    fn self_referral_is_rejected() {
        let alice = profile("alice");
        assert_eq!(
            alice.check_can_redeem(&alice),
            Err(ReferralRejection::SelfReferral)
        );
    }

    #[test]
    fn second_redemption_is_rejected() {
        let alice = profile("alice");
        let mut bob = profile("bob");
        bob.claim(alice.user_id.clone()).unwrap();

        assert_eq!(
            bob.check_can_redeem(&profile("carol")),
            Err(ReferralRejection::AlreadyUsed)
        );
    }

    #[test]
    fn claim_sets_referrer_and_flag() {
        let mut bob = profile("bob");
        bob.claim(UserId::new("alice").unwrap()).unwrap();

        assert!(bob.discount_used());
        assert_eq!(bob.referred_by.as_ref().map(|u| u.as_str()), Some("alice"));
    }

    #[test]
    fn claim_twice_fails() {
        let mut bob = profile("bob");
        bob.claim(UserId::new("alice").unwrap()).unwrap();
        assert!(bob.claim(UserId::new("carol").unwrap()).is_err());
        assert_eq!(bob.referred_by.as_ref().map(|u| u.as_str()), Some("alice"));
    }

    #[test]
    fn record_invite_increments() {
        let mut alice = profile("alice");
        alice.record_invite();
        alice.record_invite();
        assert_eq!(alice.invite_count, 2);
    }
}
