//! HTTP error mapping.
//!
//! Every error response has the shape `{"code": "...", "message": "..."}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::checkout::CheckoutError;
use crate::domain::foundation::{DomainError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// API error type that converts checkout errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub CheckoutError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CheckoutError::ValidationFailed { .. }
            | CheckoutError::AlreadyEnrolled(_)
            | CheckoutError::InvalidSignature => StatusCode::BAD_REQUEST,
            CheckoutError::CourseNotFound(_)
            | CheckoutError::CouponNotFound(_)
            | CheckoutError::EnrollmentNotFound(_) => StatusCode::NOT_FOUND,
            CheckoutError::CouponUnavailable { .. } => StatusCode::GONE,
            CheckoutError::DiscountLost(_) | CheckoutError::ReferralUnavailable(_) => {
                StatusCode::CONFLICT
            }
            CheckoutError::Gateway(_) | CheckoutError::Infrastructure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(CheckoutError::from(err))
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(CheckoutError::from(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(CheckoutError::validation("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(CheckoutError::validation("query", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}
