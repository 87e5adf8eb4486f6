//! Gateway webhook signature verification.
//!
//! The signature covers the exact bytes received. Nothing in the body is
//! parsed, logged or trusted until it checks out.

use super::gateway_event::GatewayEvent;
use super::signature::{hex_signature_matches, hmac_sha256};
use super::webhook_errors::WebhookError;

/// Header carrying `hex(HMAC-SHA256(webhook_secret, raw_body))`.
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

#[derive(Clone)]
pub struct GatewayWebhookVerifier {
    secret: String,
}

impl GatewayWebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verifies the signature over the raw body, then parses the event.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` - header absent or blank
    /// - `InvalidSignature` - malformed hex or digest mismatch
    /// - `ParseError` - signature fine but body is not a gateway event
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<GatewayEvent, WebhookError> {
        let signature = signature_header
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(WebhookError::MissingSignature)?;

        let expected = hmac_sha256(self.secret.as_bytes(), payload);
        if !hex_signature_matches(&expected, signature) {
            return Err(WebhookError::InvalidSignature);
        }

        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }
}
