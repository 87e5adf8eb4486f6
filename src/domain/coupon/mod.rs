//! Coupon domain module.
//!
//! - `code` - CouponCode normalization and the string-or-array request input
//! - `entity` - Coupon entity with redeemability rules
//! - `pricing` - DiscountPercent and half-up percentage arithmetic

mod code;
mod entity;
mod pricing;

pub use code::{CouponCode, CouponCodeInput};
pub use entity::{Coupon, CouponAvailability};
pub use pricing::{apply_percent_off, DiscountPercent};
