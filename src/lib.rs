//! Course Enrollment - paid course checkout
//!
//! Prices a course with an optional coupon or referral discount, opens a
//! Razorpay order, and turns a captured payment into exactly one active
//! enrollment, whether the confirmation arrives from the buyer's browser or
//! from the gateway webhook.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
