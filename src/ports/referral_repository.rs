//! Referral repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::referral::{ReferralCode, ReferralProfile};

#[async_trait]
pub trait ReferralRepository: Send + Sync {
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<ReferralProfile>, DomainError>;

    /// Looks up the user who owns a referral code.
    async fn find_by_code(&self, code: &ReferralCode)
        -> Result<Option<ReferralProfile>, DomainError>;

    /// Consumes `requester`'s one-time discount on behalf of `referrer`.
    ///
    /// Sets the flag and `referred_by`, and increments the referrer's invite
    /// counter, all or nothing. Returns `false` if the flag was already set,
    /// and `UserNotFound` if either user has no row.
    async fn claim(&self, requester: &UserId, referrer: &UserId) -> Result<bool, DomainError>;
}
