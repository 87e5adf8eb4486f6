//! Checkout-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 400 |
//! | CourseNotFound | 404 |
//! | AlreadyEnrolled | 400 |
//! | CouponNotFound | 404 |
//! | CouponUnavailable | 410 |
//! | DiscountLost | 409 |
//! | ReferralUnavailable | 409 |
//! | EnrollmentNotFound | 404 |
//! | InvalidSignature | 400 |
//! | Gateway | 500 |
//! | Infrastructure | 500 |

use crate::domain::coupon::CouponAvailability;
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    ValidationFailed { field: String, message: String },

    /// Course missing or not published.
    CourseNotFound(CourseId),

    /// User already holds an active or completed enrollment.
    AlreadyEnrolled(CourseId),

    /// No coupon with this code applies to the course.
    CouponNotFound(String),

    /// Coupon exists but cannot be redeemed.
    CouponUnavailable {
        code: String,
        reason: CouponAvailability,
    },

    /// The discount was quoted but consumed by a concurrent order before
    /// this one could commit it.
    DiscountLost(String),

    /// Referral discount already consumed by this user.
    ReferralUnavailable(String),

    EnrollmentNotFound(CourseId),

    InvalidSignature,

    /// Gateway refused or failed to create the order.
    Gateway(String),

    Infrastructure(String),
}

impl CheckoutError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CheckoutError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn course_not_found(id: CourseId) -> Self {
        CheckoutError::CourseNotFound(id)
    }

    pub fn already_enrolled(id: CourseId) -> Self {
        CheckoutError::AlreadyEnrolled(id)
    }

    pub fn coupon_not_found(code: impl Into<String>) -> Self {
        CheckoutError::CouponNotFound(code.into())
    }

    pub fn coupon_unavailable(code: impl Into<String>, reason: CouponAvailability) -> Self {
        CheckoutError::CouponUnavailable {
            code: code.into(),
            reason,
        }
    }

    pub fn discount_lost(what: impl Into<String>) -> Self {
        CheckoutError::DiscountLost(what.into())
    }

    pub fn referral_unavailable(reason: impl Into<String>) -> Self {
        CheckoutError::ReferralUnavailable(reason.into())
    }

    pub fn enrollment_not_found(course_id: CourseId) -> Self {
        CheckoutError::EnrollmentNotFound(course_id)
    }

    pub fn gateway(message: impl Into<String>) -> Self {
        CheckoutError::Gateway(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        CheckoutError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CheckoutError::CourseNotFound(_) => ErrorCode::CourseNotFound,
            CheckoutError::AlreadyEnrolled(_) => ErrorCode::AlreadyEnrolled,
            CheckoutError::CouponNotFound(_) => ErrorCode::CouponNotFound,
            CheckoutError::CouponUnavailable { .. } => ErrorCode::CouponUnavailable,
            CheckoutError::DiscountLost(_) => ErrorCode::Conflict,
            CheckoutError::ReferralUnavailable(_) => ErrorCode::ReferralUnavailable,
            CheckoutError::EnrollmentNotFound(_) => ErrorCode::EnrollmentNotFound,
            CheckoutError::InvalidSignature => ErrorCode::InvalidSignature,
            CheckoutError::Gateway(_) => ErrorCode::PaymentGatewayError,
            CheckoutError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// User-facing message. Infrastructure detail stays in the logs.
    pub fn message(&self) -> String {
        match self {
            CheckoutError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            CheckoutError::CourseNotFound(id) => format!("Course not found: {}", id),
            CheckoutError::AlreadyEnrolled(_) => "Already enrolled in this course".to_string(),
            CheckoutError::CouponNotFound(code) => format!("Coupon '{}' not found", code),
            CheckoutError::CouponUnavailable { code, reason } => {
                format!("Coupon '{}' is {}", code, reason.as_str())
            }
            CheckoutError::DiscountLost(what) => {
                format!("{} is no longer available, please retry", what)
            }
            CheckoutError::ReferralUnavailable(reason) => {
                format!("Referral discount unavailable: {}", reason)
            }
            CheckoutError::EnrollmentNotFound(id) => {
                format!("No pending enrollment found for course {}", id)
            }
            CheckoutError::InvalidSignature => "Invalid payment signature".to_string(),
            CheckoutError::Gateway(_) => "Payment gateway error".to_string(),
            CheckoutError::Infrastructure(_) => "Internal error".to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Infrastructure(_)
                | CheckoutError::Gateway(_)
                | CheckoutError::DiscountLost(_)
        )
    }
}

impl std::fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutError::Gateway(detail) => write!(f, "Payment gateway error: {}", detail),
            CheckoutError::Infrastructure(detail) => write!(f, "Infrastructure error: {}", detail),
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for CheckoutError {}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for CheckoutError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => CheckoutError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::InvalidSignature => CheckoutError::InvalidSignature,
            ErrorCode::PaymentGatewayError => CheckoutError::Gateway(err.message),
            _ => CheckoutError::Infrastructure(err.to_string()),
        }
    }
}

impl From<CheckoutError> for DomainError {
    fn from(err: CheckoutError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_variants() {
        assert_eq!(
            CheckoutError::already_enrolled(CourseId::new()).code(),
            ErrorCode::AlreadyEnrolled
        );
        assert_eq!(
            CheckoutError::discount_lost("Coupon 'SAVE20'").code(),
            ErrorCode::Conflict
        );
        assert_eq!(
            CheckoutError::coupon_unavailable("SAVE20", CouponAvailability::Expired).code(),
            ErrorCode::CouponUnavailable
        );
    }

    #[test]
    fn coupon_unavailable_message_names_reason() {
        let err = CheckoutError::coupon_unavailable("SAVE20", CouponAvailability::Exhausted);
        assert_eq!(err.message(), "Coupon 'SAVE20' is exhausted");
    }

    #[test]
    fn infrastructure_message_hides_detail_but_display_keeps_it() {
        let err = CheckoutError::infrastructure("pool timed out");
        assert_eq!(err.message(), "Internal error");
        assert!(err.to_string().contains("pool timed out"));
    }

    #[test]
    fn validation_error_converts_with_field() {
        let err: CheckoutError = ValidationError::empty_field("course_id").into();
        match err {
            CheckoutError::ValidationFailed { field, .. } => assert_eq!(field, "course_id"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn domain_database_error_becomes_infrastructure() {
        let err: CheckoutError = DomainError::database("boom").into();
        assert!(matches!(err, CheckoutError::Infrastructure(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn domain_validation_error_keeps_field_detail() {
        let err: CheckoutError = DomainError::validation("coupon_code", "bad").into();
        assert_eq!(
            err,
            CheckoutError::ValidationFailed {
                field: "coupon_code".to_string(),
                message: "bad".to_string()
            }
        );
    }

    #[test]
    fn converts_back_to_domain_error() {
        let err: DomainError = CheckoutError::InvalidSignature.into();
        assert_eq!(err.code, ErrorCode::InvalidSignature);
    }
}
