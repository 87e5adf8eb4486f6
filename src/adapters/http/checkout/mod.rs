//! HTTP adapter for checkout endpoints.
//!
//! - `POST /api/checkout/orders` - Create a gateway order (auth)
//! - `POST /api/checkout/confirm` - Confirm a widget payment (auth)
//! - `POST /api/webhooks/razorpay` - Handle gateway webhooks
//! - `GET /api/coupons/validate` - Validate a coupon for a course

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::CheckoutAppState;
pub use routes::checkout_router;
