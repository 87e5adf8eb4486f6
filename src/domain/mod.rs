//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, money, errors, events, state machine)
//! - `course` - Course as seen by checkout
//! - `coupon` - Coupon codes, redeemability and percentage pricing
//! - `referral` - One-time referral discount eligibility
//! - `checkout` - Price quotes and checkout errors
//! - `enrollment` - Enrollment aggregate, status machine, legacy mirror entry
//! - `payment` - Gateway events, signatures and webhook errors

pub mod checkout;
pub mod coupon;
pub mod course;
pub mod enrollment;
pub mod foundation;
pub mod payment;
pub mod referral;
