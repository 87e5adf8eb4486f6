//! Checkout handlers.
//!
//! ## Commands
//! - Creating a gateway order with an optional discount
//! - Confirming a payment from the client callback
//! - Processing gateway webhooks
//! - Cancelling abandoned pending enrollments
//!
//! ## Queries
//! - Validating a coupon for a course
//!
//! Both payment paths funnel into [`EnrollmentReconciler`], which owns the
//! idempotent write and the once-only side effects.

mod confirm_payment;
mod create_order;
mod expire_abandoned;
mod handle_payment_webhook;
mod reconcile_enrollment;
mod resolve_discount;
mod validate_coupon;

// Commands
pub use confirm_payment::{ConfirmPaymentCommand, ConfirmPaymentHandler, ConfirmPaymentResult};
pub use create_order::{CreateOrderCommand, CreateOrderHandler, CreateOrderResult};
pub use expire_abandoned::{AbandonedEnrollmentSweeper, ExpireAbandonedEnrollmentsHandler};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};

// Queries
pub use validate_coupon::{ValidateCouponHandler, ValidateCouponQuery, ValidateCouponResult};

// Shared
pub use reconcile_enrollment::EnrollmentReconciler;
pub use resolve_discount::DiscountResolver;
