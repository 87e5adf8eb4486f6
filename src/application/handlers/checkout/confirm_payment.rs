//! ConfirmPaymentHandler - Client-side confirmation after the checkout widget.
//!
//! The browser relays the gateway's signed `(order, payment)` pair. This
//! races with the webhook for the same payment; both go through the
//! reconciler, so whichever lands second is a no-op.

use std::sync::Arc;

use crate::domain::checkout::CheckoutError;
use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::{CourseId, Timestamp, UserId};
use crate::domain::payment::{CheckoutSignatureVerifier, PaymentFacts};
use crate::ports::EnrollmentRepository;

use super::EnrollmentReconciler;

#[derive(Debug, Clone)]
pub struct ConfirmPaymentCommand {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone)]
pub struct ConfirmPaymentResult {
    pub enrollment: Enrollment,
    pub newly_activated: bool,
}

pub struct ConfirmPaymentHandler {
    enrollments: Arc<dyn EnrollmentRepository>,
    verifier: CheckoutSignatureVerifier,
    reconciler: Arc<EnrollmentReconciler>,
}

impl ConfirmPaymentHandler {
    pub fn new(
        enrollments: Arc<dyn EnrollmentRepository>,
        verifier: CheckoutSignatureVerifier,
        reconciler: Arc<EnrollmentReconciler>,
    ) -> Self {
        Self {
            enrollments,
            verifier,
            reconciler,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmPaymentCommand,
    ) -> Result<ConfirmPaymentResult, CheckoutError> {
        // 1. Only the gateway can produce this signature
        self.verifier
            .verify(&cmd.gateway_order_id, &cmd.payment_id, &cmd.signature)
            .map_err(|_| {
                tracing::warn!(
                    user_id = %cmd.user_id,
                    order_id = %cmd.gateway_order_id,
                    "Checkout signature mismatch"
                );
                CheckoutError::InvalidSignature
            })?;

        // 2. The order must be the one we issued to this buyer for this course
        let enrollment = self
            .enrollments
            .find_by_user_and_course(&cmd.user_id, &cmd.course_id)
            .await?
            .filter(|e| e.belongs_to_order(&cmd.gateway_order_id))
            .ok_or_else(|| CheckoutError::enrollment_not_found(cmd.course_id))?;

        if enrollment.is_enrolled() {
            return Ok(ConfirmPaymentResult {
                enrollment,
                newly_activated: false,
            });
        }

        // 3. Reconcile with what we asked the gateway to charge
        let facts = PaymentFacts {
            amount: enrollment.payment.amount.clone(),
            method: None,
            gateway_order_id: Some(cmd.gateway_order_id.clone()),
            transaction_id: cmd.payment_id.clone(),
            captured_at: Timestamp::now(),
        };
        let outcome = self
            .reconciler
            .reconcile(&cmd.user_id, &cmd.course_id, &facts)
            .await?;

        Ok(ConfirmPaymentResult {
            enrollment: outcome.enrollment,
            newly_activated: outcome.newly_activated,
        })
    }
}
