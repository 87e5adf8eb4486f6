//! Razorpay webhook payloads.
//!
//! Only the fields reconciliation reads are captured. Correlation happens
//! through the `notes` we attach when creating the order; they come back on
//! the payment entity and, for `order.paid`, on the order entity too. The
//! order entity wins when both carry a key.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::domain::foundation::{CourseId, Currency, Money, Timestamp, UserId};

use super::{CapturedPayment, PaymentFacts, WebhookError};

/// Note keys written at order creation.
pub mod note_keys {
    pub const USER_ID: &str = "user_id";
    pub const COURSE_ID: &str = "course_id";
    pub const COUPON_CODE: &str = "coupon_code";
    pub const REFERRER_ID: &str = "referrer_id";
}

/// Top-level webhook event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEvent {
    /// Event name (e.g., "payment.captured").
    pub event: String,

    #[serde(default)]
    pub payload: GatewayEventPayload,

    /// Unix seconds.
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GatewayEventPayload {
    #[serde(default)]
    pub payment: Option<EntityWrapper<PaymentEntity>>,

    #[serde(default)]
    pub order: Option<EntityWrapper<OrderEntity>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntityWrapper<T> {
    pub entity: T,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentEntity {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "lenient_notes")]
    pub notes: GatewayNotes,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderEntity {
    pub id: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_notes")]
    pub notes: GatewayNotes,
}

/// Free-form key/value notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayNotes(pub HashMap<String, String>);

impl GatewayNotes {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

/// Accepts an object of scalars, or the empty array the gateway sends
/// when no notes were set.
fn lenient_notes<'de, D>(deserializer: D) -> Result<GatewayNotes, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    let mut notes = HashMap::new();
    if let JsonValue::Object(map) = value {
        for (key, value) in map {
            let text = match value {
                JsonValue::String(s) => s,
                JsonValue::Null => continue,
                other => other.to_string(),
            };
            notes.insert(key, text);
        }
    }
    Ok(GatewayNotes(notes))
}

/// Event types we act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEventType {
    PaymentCaptured,
    OrderPaid,
    Unknown,
}

impl GatewayEventType {
    pub fn parse(s: &str) -> Self {
        match s {
            "payment.captured" => Self::PaymentCaptured,
            "order.paid" => Self::OrderPaid,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentCaptured => "payment.captured",
            Self::OrderPaid => "order.paid",
            Self::Unknown => "unknown",
        }
    }

    /// True for events that prove money was captured.
    pub fn confirms_payment(&self) -> bool {
        matches!(self, Self::PaymentCaptured | Self::OrderPaid)
    }
}

impl GatewayEvent {
    pub fn parsed_type(&self) -> GatewayEventType {
        GatewayEventType::parse(&self.event)
    }

    /// Order notes are written by us at order creation; payment notes can be
    /// set by the checkout widget, so they only fill gaps.
    fn note(&self, key: &str) -> Option<&str> {
        let from_order = self
            .payload
            .order
            .as_ref()
            .and_then(|o| o.entity.notes.get(key));
        from_order.or_else(|| {
            self.payload
                .payment
                .as_ref()
                .and_then(|p| p.entity.notes.get(key))
        })
    }

    /// Extracts the payment and its `(user, course)` attribution.
    ///
    /// # Errors
    ///
    /// - `MissingField` when the payment entity is absent or malformed
    /// - `MissingNote` when `user_id` or `course_id` notes are absent
    pub fn captured_payment(&self) -> Result<CapturedPayment, WebhookError> {
        let payment = &self
            .payload
            .payment
            .as_ref()
            .ok_or(WebhookError::MissingField("payment"))?
            .entity;

        let user_id = self
            .note(note_keys::USER_ID)
            .ok_or(WebhookError::MissingNote(note_keys::USER_ID))
            .and_then(|raw| {
                UserId::new(raw).map_err(|_| WebhookError::MissingNote(note_keys::USER_ID))
            })?;

        let course_id = self
            .note(note_keys::COURSE_ID)
            .ok_or(WebhookError::MissingNote(note_keys::COURSE_ID))
            .and_then(|raw| {
                raw.parse::<CourseId>()
                    .map_err(|e| WebhookError::ParseError(format!("course_id note: {}", e)))
            })?;

        let currency = Currency::new(&payment.currency)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;
        let amount = Money::new(payment.amount, currency)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let gateway_order_id = payment.order_id.clone().or_else(|| {
            self.payload.order.as_ref().map(|o| o.entity.id.clone())
        });

        let captured_at = payment
            .created_at
            .or(self.created_at)
            .and_then(Timestamp::from_unix_secs)
            .unwrap_or_else(Timestamp::now);

        Ok(CapturedPayment {
            user_id,
            course_id,
            facts: PaymentFacts {
                amount,
                method: payment.method.clone(),
                gateway_order_id,
                transaction_id: payment.id.clone(),
                captured_at,
            },
        })
    }
}
