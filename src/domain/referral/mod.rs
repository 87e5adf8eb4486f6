//! Referral domain module.
//!
//! Every user owns a shareable referral code and a one-time referral
//! discount. Redeeming someone else's code at checkout takes
//! [`REFERRAL_DISCOUNT_PERCENT`] off and credits the code's owner with one
//! invite.
//!
//! - `code` - ReferralCode value object
//! - `eligibility` - ReferralStatus state machine and ReferralProfile

mod code;
mod eligibility;

pub use code::ReferralCode;
pub use eligibility::{
    ReferralProfile, ReferralRejection, ReferralStatus, REFERRAL_DISCOUNT_PERCENT,
};
