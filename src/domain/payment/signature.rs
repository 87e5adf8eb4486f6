//! HMAC-SHA256 signatures used by the payment gateway.
//!
//! The gateway signs two things with two different secrets:
//!
//! - webhook bodies: `hex(HMAC(webhook_secret, raw_body))` in `X-Razorpay-Signature`
//! - checkout completions: `hex(HMAC(key_secret, "{order_id}|{payment_id}"))`
//!   handed to the browser and posted back to us

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Computes the raw HMAC-SHA256 of `message`.
///
/// HMAC accepts keys of any length, so key setup cannot fail in practice;
/// an empty digest is returned if it ever does, which matches nothing.
pub(crate) fn hmac_sha256(secret: &[u8], message: &[u8]) -> Vec<u8> {
    match HmacSha256::new_from_slice(secret) {
        Ok(mut mac) => {
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        }
        Err(_) => Vec::new(),
    }
}

/// Compares a hex signature against the expected digest in constant time.
///
/// Malformed hex is a mismatch.
pub(crate) fn hex_signature_matches(expected: &[u8], provided_hex: &str) -> bool {
    let provided = match hex::decode(provided_hex.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    if expected.is_empty() || expected.len() != provided.len() {
        return false;
    }
    expected.ct_eq(&provided).into()
}

/// Verifies the signature the gateway's checkout widget returns to the browser.
#[derive(Clone)]
pub struct CheckoutSignatureVerifier {
    key_secret: String,
}

impl CheckoutSignatureVerifier {
    pub fn new(key_secret: impl Into<String>) -> Self {
        Self {
            key_secret: key_secret.into(),
        }
    }

    pub fn verify(
        &self,
        gateway_order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), WebhookError> {
        let message = format!("{}|{}", gateway_order_id, payment_id);
        let expected = hmac_sha256(self.key_secret.as_bytes(), message.as_bytes());

        if hex_signature_matches(&expected, signature) {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }
}

/// Hex signature for test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, message: &[u8]) -> String {
    hex::encode(hmac_sha256(secret.as_bytes(), message))
}
