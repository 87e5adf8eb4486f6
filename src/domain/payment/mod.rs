//! Payment domain module.
//!
//! Everything needed to trust and interpret what the gateway tells us.
//!
//! - `facts` - PaymentFacts / CapturedPayment shared by both confirmation paths
//! - `gateway_event` - Webhook payload types and note extraction
//! - `signature` - HMAC helpers and checkout signature verification
//! - `webhook_errors` - WebhookError with HTTP status mapping
//! - `webhook_verifier` - Raw-body webhook signature verification

mod facts;
mod gateway_event;
mod signature;
mod webhook_errors;
mod webhook_verifier;

pub use facts::{CapturedPayment, PaymentFacts};
pub use gateway_event::{
    note_keys, EntityWrapper, GatewayEvent, GatewayEventPayload, GatewayEventType, GatewayNotes,
    OrderEntity, PaymentEntity,
};
pub use signature::CheckoutSignatureVerifier;
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{GatewayWebhookVerifier, SIGNATURE_HEADER};

#[cfg(test)]
pub use signature::compute_test_signature;
