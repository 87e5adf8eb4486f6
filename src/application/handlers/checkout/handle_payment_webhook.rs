//! HandlePaymentWebhookHandler - Processes signed gateway callbacks.
//!
//! The gateway redelivers until it sees a 2xx, possibly out of order and
//! possibly concurrently with the buyer's own confirmation. Everything here
//! is idempotent per `(user, course)`.

use std::sync::Arc;

use crate::domain::foundation::{CourseId, EnrollmentId, UserId};
use crate::domain::payment::{GatewayEventType, GatewayWebhookVerifier, WebhookError};

use super::EnrollmentReconciler;

#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,

    /// `X-Razorpay-Signature` header value, if present.
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// Payment recorded against the enrollment.
    EnrollmentConfirmed {
        enrollment_id: EnrollmentId,
        user_id: UserId,
        course_id: CourseId,
        newly_activated: bool,
    },

    /// Event acknowledged without processing.
    Ignored { event: String },
}

pub struct HandlePaymentWebhookHandler {
    verifier: GatewayWebhookVerifier,
    reconciler: Arc<EnrollmentReconciler>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(verifier: GatewayWebhookVerifier, reconciler: Arc<EnrollmentReconciler>) -> Self {
        Self {
            verifier,
            reconciler,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // 1. Authenticate the raw bytes before reading any of them
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, cmd.signature.as_deref())?;

        // 2. Only captured payments move enrollments
        let event_type = event.parsed_type();
        if !event_type.confirms_payment() {
            tracing::debug!(event = %event.event, "Ignoring gateway event");
            return Ok(HandlePaymentWebhookResult::Ignored { event: event.event });
        }

        // 3. Attribute the payment through the order notes
        let captured = event.captured_payment().map_err(|e| {
            tracing::warn!(event = %event.event, error = %e, "Unprocessable gateway event");
            e
        })?;

        // 4. Reconcile; a store failure makes the gateway retry
        let outcome = self
            .reconciler
            .reconcile(&captured.user_id, &captured.course_id, &captured.facts)
            .await
            .map_err(|e| {
                tracing::error!(
                    event = event_type.as_str(),
                    transaction_id = %captured.facts.transaction_id,
                    error = %e,
                    "Webhook reconciliation failed"
                );
                WebhookError::Database(e.to_string())
            })?;

        Ok(HandlePaymentWebhookResult::EnrollmentConfirmed {
            enrollment_id: outcome.enrollment.id,
            user_id: captured.user_id,
            course_id: captured.course_id,
            newly_activated: outcome.newly_activated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{
        InMemoryCourseCatalog, InMemoryEnrollmentRepository, InMemoryLegacyMirror,
    };
    use crate::domain::course::Course;
    use crate::domain::enrollment::EnrollmentStatus;
    use crate::domain::foundation::{Currency, Money};
    use crate::domain::payment::compute_test_signature;
    use crate::ports::EnrollmentRepository;
    use serde_json::json;

    const SECRET: &str = "whsec_test";

    struct Fixture {
        handler: HandlePaymentWebhookHandler,
        enrollments: Arc<InMemoryEnrollmentRepository>,
        catalog: Arc<InMemoryCourseCatalog>,
        course: Course,
    }

    fn fixture() -> Fixture {
        let course = Course {
            id: CourseId::new(),
            title: "Zero to Production".to_string(),
            price: Money::new(1999, Currency::inr()).unwrap(),
            is_published: true,
            enrollment_count: 0,
        };
        let enrollments = Arc::new(InMemoryEnrollmentRepository::new());
        let catalog = Arc::new(InMemoryCourseCatalog::new().with_course(course.clone()));
        let reconciler = Arc::new(EnrollmentReconciler::new(
            enrollments.clone(),
            Arc::new(InMemoryLegacyMirror::new()),
            catalog.clone(),
            Arc::new(InMemoryEventBus::new()),
        ));
        Fixture {
            handler: HandlePaymentWebhookHandler::new(GatewayWebhookVerifier::new(SECRET), reconciler),
            enrollments,
            catalog,
            course,
        }
    }

    fn captured_body(notes: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "event": "payment.captured",
            "payload": {
                "payment": {
                    "entity": {
                        "id": "pay_1",
                        "amount": 1599,
                        "currency": "INR",
                        "status": "captured",
                        "order_id": "order_1",
                        "method": "upi",
                        "notes": notes,
                        "created_at": 1700000000
                    }
                }
            },
            "created_at": 1700000001
        }))
        .unwrap()
    }

    fn signed(payload: Vec<u8>) -> HandlePaymentWebhookCommand {
        let signature = compute_test_signature(SECRET, &payload);
        HandlePaymentWebhookCommand {
            payload,
            signature: Some(signature),
        }
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[tokio::test]
    async fn captured_payment_activates_enrollment() {
        let f = fixture();
        let body = captured_body(
            json!({"user_id": "user-1", "course_id": f.course.id.to_string()}),
        );

        let result = f.handler.handle(signed(body)).await.unwrap();

        match result {
            HandlePaymentWebhookResult::EnrollmentConfirmed { newly_activated, .. } => {
                assert!(newly_activated)
            }
            other => panic!("expected EnrollmentConfirmed, got {:?}", other),
        }
        let stored = f
            .enrollments
            .find_by_user_and_course(&user(), &f.course.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, EnrollmentStatus::Active);
        assert_eq!(stored.payment.method.as_deref(), Some("upi"));
        assert_eq!(stored.payment.paid_at.map(|t| t.as_unix_secs()), Some(1700000000));
    }

    #[tokio::test]
    async fn redelivery_does_not_double_count() {
        let f = fixture();
        let body = captured_body(
            json!({"user_id": "user-1", "course_id": f.course.id.to_string()}),
        );

        f.handler.handle(signed(body.clone())).await.unwrap();
        f.handler.handle(signed(body)).await.unwrap();

        assert_eq!(f.enrollments.len(), 1);
        assert_eq!(f.catalog.enrollment_count(&f.course.id), Some(1));
    }

    #[tokio::test]
    async fn tampered_body_is_rejected() {
        let f = fixture();
        let body = captured_body(
            json!({"user_id": "user-1", "course_id": f.course.id.to_string()}),
        );
        let mut cmd = signed(body);
        let last = cmd.payload.len() - 2;
        cmd.payload[last] = b' ';

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err, WebhookError::InvalidSignature));
        assert!(f.enrollments.is_empty());
    }

    #[tokio::test]
    async fn missing_signature_is_rejected() {
        let f = fixture();
        let cmd = HandlePaymentWebhookCommand {
            payload: b"{}".to_vec(),
            signature: None,
        };

        assert!(matches!(
            f.handler.handle(cmd).await.unwrap_err(),
            WebhookError::MissingSignature
        ));
    }

    #[tokio::test]
    async fn unrelated_event_is_ignored() {
        let f = fixture();
        let body = serde_json::to_vec(&json!({"event": "refund.created", "payload": {}})).unwrap();

        let result = f.handler.handle(signed(body)).await.unwrap();

        assert_eq!(
            result,
            HandlePaymentWebhookResult::Ignored {
                event: "refund.created".to_string()
            }
        );
    }

    #[tokio::test]
    async fn missing_notes_are_unprocessable() {
        let f = fixture();
        let body = captured_body(json!([]));

        let err = f.handler.handle(signed(body)).await.unwrap_err();

        assert!(matches!(err, WebhookError::MissingNote("user_id")));
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn order_paid_uses_order_notes() {
        let f = fixture();
        let body = serde_json::to_vec(&json!({
            "event": "order.paid",
            "payload": {
                "payment": {"entity": {
                    "id": "pay_9", "amount": 1999, "currency": "INR",
                    "order_id": "order_9", "notes": []
                }},
                "order": {"entity": {
                    "id": "order_9",
                    "notes": {"user_id": "user-1", "course_id": f.course.id.to_string()}
                }}
            }
        }))
        .unwrap();

        f.handler.handle(signed(body)).await.unwrap();

        let stored = f
            .enrollments
            .find_by_user_and_course(&user(), &f.course.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.payment.transaction_id.as_deref(), Some("pay_9"));
    }
}
