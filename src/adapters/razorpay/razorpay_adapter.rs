//! Razorpay Orders API adapter.
//!
//! Implements `PaymentGateway` over the REST API. Authentication is HTTP
//! basic with the key id as user and the key secret as password.
//!
//! # Configuration
//!
//! ```ignore
//! let config = RazorpayConfig::new(key_id, key_secret);
//! let gateway = RazorpayGateway::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::ports::{CreateOrderRequest, GatewayOrder, PaymentError, PaymentErrorCode, PaymentGateway};

const DEFAULT_API_BASE: &str = "https://api.razorpay.com";

/// Razorpay API configuration.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Publishable key id (rzp_live_... or rzp_test_...).
    key_id: String,

    /// API key secret. Also signs checkout callbacks.
    key_secret: SecretString,

    api_base_url: String,

    timeout: Duration,
}

impl RazorpayConfig {
    pub fn new(key_id: impl Into<String>, key_secret: SecretString) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret,
            api_base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct RazorpayGateway {
    config: RazorpayConfig,
    http_client: reqwest::Client,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config,
            http_client,
        }
    }
}

#[derive(Serialize)]
struct OrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct RazorpayOrder {
    id: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    receipt: Option<String>,
    status: String,
}

#[derive(Deserialize)]
struct RazorpayErrorEnvelope {
    error: RazorpayErrorBody,
}

#[derive(Deserialize)]
struct RazorpayErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Maps a non-success response to a `PaymentError`.
fn error_from_response(status: reqwest::StatusCode, body: &str) -> PaymentError {
    let code = match status.as_u16() {
        400 | 404 | 422 => PaymentErrorCode::InvalidRequest,
        401 | 403 => PaymentErrorCode::AuthenticationError,
        429 => PaymentErrorCode::RateLimitExceeded,
        500..=599 => PaymentErrorCode::ProviderError,
        _ => PaymentErrorCode::Unknown,
    };

    match serde_json::from_str::<RazorpayErrorEnvelope>(body) {
        Ok(envelope) => {
            let message = envelope
                .error
                .description
                .unwrap_or_else(|| format!("Razorpay returned {}", status));
            let err = PaymentError::new(code, message);
            match envelope.error.code {
                Some(provider_code) => err.with_provider_code(provider_code),
                None => err,
            }
        }
        Err(_) => PaymentError::new(code, format!("Razorpay returned {}: {}", status, body)),
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, PaymentError> {
        let url = format!("{}/v1/orders", self.config.api_base_url);
        let body = OrderBody {
            amount: request.amount.amount_minor(),
            currency: request.amount.currency().as_str(),
            receipt: &request.receipt,
            notes: &request.notes,
        };

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let err = error_from_response(status, &error_text);
            tracing::error!(
                status = %status,
                provider_code = ?err.provider_code,
                error = %err.message,
                "Razorpay create_order failed"
            );
            return Err(err);
        }

        let order: RazorpayOrder = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Razorpay response: {}", e))
        })?;

        Ok(GatewayOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
            receipt: order.receipt,
            status: order.status,
        })
    }

    fn public_key_id(&self) -> String {
        self.config.key_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RazorpayConfig {
        RazorpayConfig::new("rzp_test_key", SecretString::new("secret".to_string()))
    }

    #[test]
    fn config_defaults_to_public_api() {
        assert_eq!(config().api_base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn config_with_base_url() {
        let config = config().with_base_url("http://localhost:9999");
        assert_eq!(config.api_base_url, "http://localhost:9999");
    }

    #[test]
    fn public_key_id_is_the_key_id() {
        assert_eq!(RazorpayGateway::new(config()).public_key_id(), "rzp_test_key");
    }

    #[test]
    fn bad_request_maps_to_invalid_request_with_provider_code() {
        let body = r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"amount must be at least INR 1.00"}}"#;
        let err = error_from_response(reqwest::StatusCode::BAD_REQUEST, body);

        assert_eq!(err.code, PaymentErrorCode::InvalidRequest);
        assert_eq!(err.provider_code.as_deref(), Some("BAD_REQUEST_ERROR"));
        assert_eq!(err.message, "amount must be at least INR 1.00");
        assert!(!err.retryable);
    }

    #[test]
    fn unauthorized_maps_to_authentication_error() {
        let err = error_from_response(reqwest::StatusCode::UNAUTHORIZED, "not json");
        assert_eq!(err.code, PaymentErrorCode::AuthenticationError);
        assert!(err.message.contains("not json"));
    }

    #[test]
    fn server_error_is_retryable() {
        let err = error_from_response(reqwest::StatusCode::BAD_GATEWAY, "");
        assert!(err.retryable);
    }

    #[test]
    fn order_body_serializes_minor_units() {
        let notes = BTreeMap::from([("user_id".to_string(), "u1".to_string())]);
        let body = OrderBody {
            amount: 1599,
            currency: "INR",
            receipt: "rcpt_1",
            notes: &notes,
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["amount"], 1599);
        assert_eq!(json["currency"], "INR");
        assert_eq!(json["notes"]["user_id"], "u1");
    }
}
