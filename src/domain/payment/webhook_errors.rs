//! Webhook error types for gateway callbacks.
//!
//! The gateway retries on any non-2xx response, so the status mapping
//! decides what gets redelivered: 4xx for payloads that will never succeed,
//! 5xx for store failures that might.

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    /// `X-Razorpay-Signature` header absent.
    #[error("Missing signature")]
    MissingSignature,

    /// Signature did not match the body.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Failed to parse webhook payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Correlation note missing from payment and order notes.
    #[error("Missing note: {0}")]
    MissingNote(&'static str),

    /// Required field missing from webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Event acknowledged without processing.
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// Canonical store write failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the gateway should redeliver this webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::ParseError(_)
            | WebhookError::MissingNote(_)
            | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            WebhookError::Ignored(_) => StatusCode::OK,

            WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_failures_are_bad_request() {
        assert_eq!(
            WebhookError::InvalidSignature.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::MissingSignature.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unprocessable_payloads_are_not_retried() {
        for err in [
            WebhookError::ParseError("eof".into()),
            WebhookError::MissingNote("course_id"),
            WebhookError::MissingField("payment"),
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn ignored_events_are_acknowledged() {
        let err = WebhookError::Ignored("refund.created".into());
        assert_eq!(err.status_code(), StatusCode::OK);
        assert!(!err.is_retryable());
    }

    #[test]
    fn database_errors_are_retried() {
        let err = WebhookError::Database("connection reset".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_note_displays_name() {
        assert_eq!(
            WebhookError::MissingNote("user_id").to_string(),
            "Missing note: user_id"
        );
    }
}
