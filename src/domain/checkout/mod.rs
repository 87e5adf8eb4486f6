//! Checkout domain module.
//!
//! - `quote` - PriceQuote with at most one applied discount
//! - `errors` - CheckoutError taxonomy shared by the checkout handlers

mod errors;
mod quote;

pub use errors::CheckoutError;
pub use quote::{AppliedDiscount, PriceQuote};
