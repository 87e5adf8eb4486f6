use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::coupon::{Coupon, CouponCode};
use crate::domain::foundation::{CouponId, DomainError, Timestamp};
use crate::ports::CouponRepository;

use super::poisoned;

#[derive(Default)]
pub struct InMemoryCouponRepository {
    coupons: Mutex<HashMap<CouponId, Coupon>>,
}

impl InMemoryCouponRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coupon(self, coupon: Coupon) -> Self {
        self.insert(coupon);
        self
    }

    pub fn insert(&self, coupon: Coupon) {
        if let Ok(mut coupons) = self.coupons.lock() {
            coupons.insert(coupon.id, coupon);
        }
    }

    /// Snapshot of a stored coupon, for assertions.
    pub fn get(&self, code: &str) -> Option<Coupon> {
        let code = CouponCode::try_new(code).ok()?;
        self.coupons
            .lock()
            .ok()?
            .values()
            .find(|c| c.code == code)
            .cloned()
    }
}

#[async_trait]
impl CouponRepository for InMemoryCouponRepository {
    async fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>, DomainError> {
        let coupons = self.coupons.lock().map_err(|_| poisoned())?;
        Ok(coupons.values().find(|c| &c.code == code).cloned())
    }

    async fn redeem(&self, id: &CouponId) -> Result<Option<Coupon>, DomainError> {
        let mut coupons = self.coupons.lock().map_err(|_| poisoned())?;
        Ok(match coupons.get_mut(id) {
            Some(coupon) => coupon.redeem(Timestamp::now()).then(|| coupon.clone()),
            None => None,
        })
    }
}
