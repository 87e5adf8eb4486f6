//! HTTP handlers for checkout endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::adapters::http::error::{ApiError, ErrorResponse};
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::checkout::{
    ConfirmPaymentCommand, ConfirmPaymentHandler, CreateOrderCommand, CreateOrderHandler,
    DiscountResolver, EnrollmentReconciler, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler, HandlePaymentWebhookResult, ValidateCouponHandler,
    ValidateCouponQuery,
};
use crate::domain::checkout::CheckoutError;
use crate::domain::coupon::{CouponCode, CouponCodeInput};
use crate::domain::foundation::CourseId;
use crate::domain::payment::{
    CheckoutSignatureVerifier, GatewayWebhookVerifier, WebhookError, SIGNATURE_HEADER,
};
use crate::domain::referral::ReferralCode;
use crate::ports::{
    CouponRepository, CourseCatalog, EnrollmentRepository, EventPublisher,
    LegacyEnrollmentMirror, PaymentGateway, ReferralRepository,
};

use super::dto::{
    CheckoutOrderRequest, CheckoutOrderResponse, ConfirmPaymentRequest, ConfirmPaymentResponse,
    ValidateCouponParams, ValidateCouponResponse, WebhookAckResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all checkout dependencies.
///
/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct CheckoutAppState {
    pub catalog: Arc<dyn CourseCatalog>,
    pub coupons: Arc<dyn CouponRepository>,
    pub referrals: Arc<dyn ReferralRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub legacy_mirror: Arc<dyn LegacyEnrollmentMirror>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub checkout_verifier: CheckoutSignatureVerifier,
    pub webhook_verifier: GatewayWebhookVerifier,
}

impl CheckoutAppState {
    /// Create handlers on demand from the shared state.
    pub fn create_order_handler(&self) -> CreateOrderHandler {
        CreateOrderHandler::new(
            self.catalog.clone(),
            self.enrollments.clone(),
            Arc::new(DiscountResolver::new(
                self.coupons.clone(),
                self.referrals.clone(),
            )),
            self.gateway.clone(),
        )
    }

    pub fn confirm_payment_handler(&self) -> ConfirmPaymentHandler {
        ConfirmPaymentHandler::new(
            self.enrollments.clone(),
            self.checkout_verifier.clone(),
            self.reconciler(),
        )
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(self.webhook_verifier.clone(), self.reconciler())
    }

    pub fn validate_coupon_handler(&self) -> ValidateCouponHandler {
        ValidateCouponHandler::new(self.coupons.clone())
    }

    fn reconciler(&self) -> Arc<EnrollmentReconciler> {
        Arc::new(EnrollmentReconciler::new(
            self.enrollments.clone(),
            self.legacy_mirror.clone(),
            self.catalog.clone(),
            self.event_publisher.clone(),
        ))
    }
}

fn parse_course_id(raw: &str) -> Result<CourseId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError(CheckoutError::validation("courseId", "must be a UUID")))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/checkout/orders - Price the course and open a gateway order
pub async fn create_order(
    State(state): State<CheckoutAppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<CheckoutOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;

    // A malformed code prices like no code at all.
    let coupon_code = match request.coupon_code {
        Some(input) => input
            .into_single_entry()?
            .and_then(|raw| match CouponCode::try_new(&raw) {
                Ok(code) => Some(code),
                Err(e) => {
                    tracing::info!(coupon_code = %raw, error = %e, "Ignoring malformed coupon code");
                    None
                }
            }),
        None => None,
    };
    let referral_code = request
        .referral_code
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(ReferralCode::try_new)
        .transpose()?;

    let cmd = CreateOrderCommand {
        user_id: user.id,
        course_id: parse_course_id(&request.course_id)?,
        coupon_code,
        referral_code,
    };

    let result = state.create_order_handler().handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(CheckoutOrderResponse::from(result))))
}

/// POST /api/checkout/confirm - Record the payment the widget reported
pub async fn confirm_payment(
    State(state): State<CheckoutAppState>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<ConfirmPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;

    let cmd = ConfirmPaymentCommand {
        user_id: user.id,
        course_id: parse_course_id(&request.course_id)?,
        gateway_order_id: request.razorpay_order_id,
        payment_id: request.razorpay_payment_id,
        signature: request.razorpay_signature,
    };

    let result = state.confirm_payment_handler().handle(cmd).await?;

    Ok(Json(ConfirmPaymentResponse::from(result)))
}

/// POST /api/webhooks/razorpay - Handle gateway webhook events
///
/// The body is taken as raw bytes; the signature covers them exactly.
pub async fn handle_razorpay_webhook(
    State(state): State<CheckoutAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match state.webhook_handler().handle(cmd).await {
        Ok(HandlePaymentWebhookResult::EnrollmentConfirmed {
            enrollment_id,
            newly_activated,
            ..
        }) => {
            tracing::info!(%enrollment_id, newly_activated, "Webhook reconciled");
            (StatusCode::OK, Json(WebhookAckResponse::ok())).into_response()
        }
        Ok(HandlePaymentWebhookResult::Ignored { .. }) => {
            (StatusCode::OK, Json(WebhookAckResponse::ok())).into_response()
        }
        Err(e) => webhook_error_response(e),
    }
}

fn webhook_error_response(err: WebhookError) -> Response {
    let status = err.status_code();
    if err.is_retryable() {
        tracing::error!(error = %err, "Webhook processing failed, gateway will retry");
    } else {
        tracing::warn!(error = %err, "Webhook rejected");
    }

    let code = match &err {
        WebhookError::MissingSignature | WebhookError::InvalidSignature => "INVALID_SIGNATURE",
        WebhookError::Database(_) => "DATABASE_ERROR",
        _ => "VALIDATION_FAILED",
    };
    let message = match &err {
        WebhookError::Database(_) => "Internal error".to_string(),
        other => other.to_string(),
    };
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/coupons/validate - Check a coupon against a course
pub async fn validate_coupon(
    State(state): State<CheckoutAppState>,
    params: Result<Query<ValidateCouponParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params?;

    let code = CouponCodeInput::One(params.code)
        .into_single()?
        .ok_or_else(|| ApiError(CheckoutError::validation("code", "is required")))?;

    let query = ValidateCouponQuery {
        code,
        course_id: parse_course_id(&params.course_id)?,
    };

    let result = state.validate_coupon_handler().handle(query).await?;

    Ok(Json(ValidateCouponResponse::from(result)))
}
