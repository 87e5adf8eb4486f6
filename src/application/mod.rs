//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (write) are kept apart from query handlers (read).

pub mod handlers;

pub use handlers::{
    // Checkout commands
    ConfirmPaymentCommand, ConfirmPaymentHandler, ConfirmPaymentResult,
    CreateOrderCommand, CreateOrderHandler, CreateOrderResult,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    // Maintenance
    AbandonedEnrollmentSweeper, ExpireAbandonedEnrollmentsHandler,
    // Queries
    ValidateCouponHandler, ValidateCouponQuery, ValidateCouponResult,
    // Shared
    DiscountResolver, EnrollmentReconciler,
};
