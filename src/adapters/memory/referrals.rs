use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::referral::{ReferralCode, ReferralProfile};
use crate::ports::ReferralRepository;

use super::poisoned;

#[derive(Default)]
pub struct InMemoryReferralRepository {
    profiles: Mutex<HashMap<UserId, ReferralProfile>>,
}

impl InMemoryReferralRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, profile: ReferralProfile) -> Self {
        self.insert(profile);
        self
    }

    pub fn insert(&self, profile: ReferralProfile) {
        if let Ok(mut profiles) = self.profiles.lock() {
            profiles.insert(profile.user_id.clone(), profile);
        }
    }

    pub fn get(&self, user_id: &UserId) -> Option<ReferralProfile> {
        self.profiles.lock().ok()?.get(user_id).cloned()
    }
}

#[async_trait]
impl ReferralRepository for InMemoryReferralRepository {
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<ReferralProfile>, DomainError> {
        let profiles = self.profiles.lock().map_err(|_| poisoned())?;
        Ok(profiles.get(user_id).cloned())
    }

    async fn find_by_code(
        &self,
        code: &ReferralCode,
    ) -> Result<Option<ReferralProfile>, DomainError> {
        let profiles = self.profiles.lock().map_err(|_| poisoned())?;
        Ok(profiles
            .values()
            .find(|p| p.referral_code.as_ref() == Some(code))
            .cloned())
    }

    async fn claim(&self, requester: &UserId, referrer: &UserId) -> Result<bool, DomainError> {
        let mut profiles = self.profiles.lock().map_err(|_| poisoned())?;

        if !profiles.contains_key(referrer) {
            return Err(DomainError::new(
                ErrorCode::UserNotFound,
                format!("Referrer not found: {}", referrer),
            ));
        }

        let profile = profiles.get_mut(requester).ok_or_else(|| {
            DomainError::new(
                ErrorCode::UserNotFound,
                format!("Requester not found: {}", requester),
            )
        })?;
        if profile.discount_used() {
            return Ok(false);
        }
        profile.claim(referrer.clone())?;

        if let Some(inviter) = profiles.get_mut(referrer) {
            inviter.record_invite();
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, code: &str) -> ReferralProfile {
        ReferralProfile::new(
            UserId::new(id).unwrap(),
            Some(ReferralCode::try_new(code).unwrap()),
        )
    }

    #[tokio::test]
    async fn claim_flips_flag_and_counts_invite() {
        let repo = InMemoryReferralRepository::new()
            .with_profile(profile("alice", "ALICE1"))
            .with_profile(profile("bob", "BOB123"));
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();

        assert!(repo.claim(&bob, &alice).await.unwrap());
        assert!(!repo.claim(&bob, &alice).await.unwrap());

        assert!(repo.get(&bob).unwrap().discount_used());
        assert_eq!(repo.get(&alice).unwrap().invite_count, 1);
    }

    #[tokio::test]
    async fn find_by_code_normalizes_case() {
        let repo = InMemoryReferralRepository::new().with_profile(profile("alice", "ALICE1"));
        let found = repo
            .find_by_code(&ReferralCode::try_new("alice1").unwrap())
            .await
            .unwrap();

        assert_eq!(found.map(|p| p.user_id.to_string()), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn claim_for_unknown_referrer_fails() {
        let repo = InMemoryReferralRepository::new();
        let err = repo
            .claim(&UserId::new("bob").unwrap(), &UserId::new("ghost").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn claim_for_unknown_requester_fails() {
        let repo = InMemoryReferralRepository::new().with_profile(profile("alice", "ALICE1"));
        let err = repo
            .claim(&UserId::new("ghost").unwrap(), &UserId::new("alice").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
        assert_eq!(repo.get(&UserId::new("alice").unwrap()).unwrap().invite_count, 0);
    }
}
