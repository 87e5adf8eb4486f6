//! Axum router configuration for checkout endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    confirm_payment, create_order, handle_razorpay_webhook, validate_coupon, CheckoutAppState,
};

/// Buyer endpoints (require authentication).
///
/// - `POST /orders` - Create a gateway order
/// - `POST /confirm` - Confirm a payment from the checkout widget
pub fn checkout_routes() -> Router<CheckoutAppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/confirm", post(confirm_payment))
}

/// Gateway callbacks. No user auth; verified by signature.
///
/// - `POST /razorpay` - Handle Razorpay webhooks
pub fn webhook_routes() -> Router<CheckoutAppState> {
    Router::new().route("/razorpay", post(handle_razorpay_webhook))
}

/// Public coupon lookups.
///
/// - `GET /validate` - Validate a coupon for a course
pub fn coupon_routes() -> Router<CheckoutAppState> {
    Router::new().route("/validate", get(validate_coupon))
}

/// The complete checkout module router, meant to be nested under `/api`.
pub fn checkout_router() -> Router<CheckoutAppState> {
    Router::new()
        .nest("/checkout", checkout_routes())
        .nest("/webhooks", webhook_routes())
        .nest("/coupons", coupon_routes())
}
