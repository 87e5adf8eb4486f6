//! Payment configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::razorpay::RazorpayConfig;

/// Razorpay credentials and endpoint
#[derive(Clone, Deserialize)]
pub struct PaymentConfig {
    /// Publishable key id (`rzp_test_...` or `rzp_live_...`)
    pub razorpay_key_id: String,

    /// API secret; also signs checkout confirmations
    pub razorpay_key_secret: String,

    /// Webhook signing secret
    pub razorpay_webhook_secret: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Gateway request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl PaymentConfig {
    pub fn is_test_mode(&self) -> bool {
        self.razorpay_key_id.starts_with("rzp_test_")
    }

    pub fn gateway_config(&self) -> RazorpayConfig {
        RazorpayConfig::new(
            self.razorpay_key_id.clone(),
            SecretString::new(self.razorpay_key_secret.clone()),
        )
        .with_base_url(self.api_base_url.clone())
        .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.razorpay_key_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__RAZORPAY_KEY_ID"));
        }
        if self.razorpay_key_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__RAZORPAY_KEY_SECRET"));
        }
        if self.razorpay_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT__RAZORPAY_WEBHOOK_SECRET",
            ));
        }
        if !self.razorpay_key_id.starts_with("rzp_") {
            return Err(ValidationError::InvalidRazorpayKeyId);
        }

        if *environment == Environment::Production {
            if !self.api_base_url.starts_with("https://") {
                return Err(ValidationError::GatewayUrlMustBeHttps);
            }
            if self.is_test_mode() {
                return Err(ValidationError::TestKeyInProduction);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("razorpay_key_id", &self.razorpay_key_id)
            .field("razorpay_key_secret", &"[REDACTED]")
            .field("razorpay_webhook_secret", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_api_base_url() -> String {
    "https://api.razorpay.com".to_string()
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key_id: &str) -> PaymentConfig {
        PaymentConfig {
            razorpay_key_id: key_id.to_string(),
            razorpay_key_secret: "key_secret".to_string(),
            razorpay_webhook_secret: "webhook_secret".to_string(),
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout(),
        }
    }

    #[test]
    fn test_is_test_mode() {
        assert!(config("rzp_test_abc").is_test_mode());
        assert!(!config("rzp_live_abc").is_test_mode());
    }

    #[test]
    fn test_key_prefix_is_checked() {
        assert_eq!(
            config("sk_test_abc").validate(&Environment::Development),
            Err(ValidationError::InvalidRazorpayKeyId)
        );
        assert!(config("rzp_test_abc")
            .validate(&Environment::Development)
            .is_ok());
    }

    #[test]
    fn test_missing_webhook_secret() {
        let mut c = config("rzp_test_abc");
        c.razorpay_webhook_secret.clear();
        assert_eq!(
            c.validate(&Environment::Development),
            Err(ValidationError::MissingRequired(
                "PAYMENT__RAZORPAY_WEBHOOK_SECRET"
            ))
        );
    }

    #[test]
    fn test_production_rules() {
        assert_eq!(
            config("rzp_test_abc").validate(&Environment::Production),
            Err(ValidationError::TestKeyInProduction)
        );

        let mut c = config("rzp_live_abc");
        c.api_base_url = "http://localhost:9000".to_string();
        assert_eq!(
            c.validate(&Environment::Production),
            Err(ValidationError::GatewayUrlMustBeHttps)
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", config("rzp_test_abc"));
        assert!(!rendered.contains("key_secret\""));
        assert!(!rendered.contains("webhook_secret\""));
        assert!(rendered.contains("rzp_test_abc"));
    }
}
