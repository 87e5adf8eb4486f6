//! Razorpay payment gateway adapters.
//!
//! - `RazorpayGateway` - REST client for the Orders API
//! - `MockPaymentGateway` - Configurable test double with call tracking

mod mock_gateway;
mod razorpay_adapter;

pub use mock_gateway::MockPaymentGateway;
pub use razorpay_adapter::{RazorpayConfig, RazorpayGateway};
