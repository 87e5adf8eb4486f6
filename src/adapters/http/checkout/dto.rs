//! HTTP DTOs for checkout endpoints.
//!
//! Field names are camelCase on the wire to match the browser client.

use serde::{Deserialize, Serialize};

use crate::application::handlers::checkout::{
    ConfirmPaymentResult, CreateOrderResult, ValidateCouponResult,
};
use crate::domain::coupon::CouponCodeInput;
use crate::domain::enrollment::{Enrollment, EnrollmentStatus};
use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/checkout/orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrderRequest {
    pub course_id: String,

    /// A single code, a comma-joined string, or an array of codes.
    #[serde(default)]
    pub coupon_code: Option<CouponCodeInput>,

    #[serde(default)]
    pub referral_code: Option<String>,
}

/// Body of `POST /api/checkout/confirm`, as returned by the checkout widget.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub course_id: String,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Query of `GET /api/coupons/validate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponParams {
    pub code: String,
    pub course_id: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrderResponse {
    pub order: OrderResponse,
    pub course: CoursePricingResponse,
    pub enrollment: EnrollmentRefResponse,
}

/// What the browser needs to open the checkout widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    /// Minor units.
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
    pub key_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePricingResponse {
    pub id: String,
    pub title: String,
    /// Charged price in minor units.
    pub price: i64,
    pub original_price: i64,
    pub currency: String,
    pub discount_percent: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_coupon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRefResponse {
    pub id: String,
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentResponse {
    pub enrollment: ConfirmedEnrollmentResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedEnrollmentResponse {
    pub id: String,
    pub status: EnrollmentStatus,
    /// ISO 8601.
    pub paid_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponResponse {
    pub code: String,
    pub percent_off: u8,
    /// ISO 8601, absent for coupons that never expire.
    pub expires_at: Option<String>,
}

/// Acknowledgement the gateway expects on a handled webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub status: String,
}

impl WebhookAckResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Conversions
// ════════════════════════════════════════════════════════════════════════════════

fn iso8601(ts: &Timestamp) -> String {
    ts.as_datetime().to_rfc3339()
}

impl From<&Enrollment> for EnrollmentRefResponse {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            id: enrollment.id.to_string(),
            status: enrollment.status,
        }
    }
}

impl From<CreateOrderResult> for CheckoutOrderResponse {
    fn from(result: CreateOrderResult) -> Self {
        let quote = &result.quote;
        Self {
            course: CoursePricingResponse {
                id: result.enrollment.course_id.to_string(),
                title: result.course_title.clone(),
                price: quote.price.amount_minor(),
                original_price: quote.original.amount_minor(),
                currency: quote.price.currency().as_str().to_string(),
                discount_percent: quote.discount_percent(),
                applied_coupon: quote.applied_coupon().map(|c| c.to_string()),
            },
            enrollment: EnrollmentRefResponse::from(&result.enrollment),
            order: OrderResponse {
                id: result.order.id,
                amount: result.order.amount,
                currency: result.order.currency,
                receipt: result.order.receipt,
                status: result.order.status,
                key_id: result.key_id,
            },
        }
    }
}

impl From<ConfirmPaymentResult> for ConfirmPaymentResponse {
    fn from(result: ConfirmPaymentResult) -> Self {
        let enrollment = result.enrollment;
        Self {
            enrollment: ConfirmedEnrollmentResponse {
                id: enrollment.id.to_string(),
                status: enrollment.status,
                paid_at: enrollment.payment.paid_at.as_ref().map(iso8601),
            },
        }
    }
}

impl From<ValidateCouponResult> for ValidateCouponResponse {
    fn from(result: ValidateCouponResult) -> Self {
        Self {
            code: result.code.to_string(),
            percent_off: result.percent_off.value(),
            expires_at: result.expires_at.as_ref().map(iso8601),
        }
    }
}
