//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod checkout;

pub use checkout::{
    AbandonedEnrollmentSweeper, ConfirmPaymentCommand, ConfirmPaymentHandler,
    ConfirmPaymentResult, CreateOrderCommand, CreateOrderHandler, CreateOrderResult,
    DiscountResolver, EnrollmentReconciler, ExpireAbandonedEnrollmentsHandler,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    ValidateCouponHandler, ValidateCouponQuery, ValidateCouponResult,
};
