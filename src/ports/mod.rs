//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `CourseCatalog` - Course lookup and enrollment counter
//! - `CouponRepository` - Coupon lookup and atomic redemption
//! - `ReferralRepository` - Referral profiles and atomic claim
//! - `EnrollmentRepository` - Canonical enrollment upserts
//! - `LegacyEnrollmentMirror` - Embedded per-user enrollment list
//!
//! ## External Service Ports
//!
//! - `PaymentGateway` - Order creation with the payment gateway
//! - `EventPublisher` - Notification sink
//! - `SessionValidator` - Bearer token validation

mod coupon_repository;
mod course_catalog;
mod enrollment_repository;
mod event_publisher;
mod legacy_enrollment_mirror;
mod payment_gateway;
mod referral_repository;
mod session_validator;

pub use coupon_repository::CouponRepository;
pub use course_catalog::CourseCatalog;
pub use enrollment_repository::{EnrollmentRepository, OpenPendingOutcome, ReconcileOutcome};
pub use event_publisher::EventPublisher;
pub use legacy_enrollment_mirror::LegacyEnrollmentMirror;
pub use payment_gateway::{
    CreateOrderRequest, GatewayOrder, PaymentError, PaymentErrorCode, PaymentGateway,
};
pub use referral_repository::ReferralRepository;
pub use session_validator::SessionValidator;
