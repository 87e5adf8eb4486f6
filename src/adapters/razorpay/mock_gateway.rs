//! Mock payment gateway for testing.
//!
//! Supports error injection and call tracking. Orders get sequential ids
//! (`order_mock_1`, `order_mock_2`, ...).
//!
//! Test-only: lock poisoning panics.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{CreateOrderRequest, GatewayOrder, PaymentError, PaymentGateway};

#[derive(Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    next_error: Option<PaymentError>,
    fail_all: Option<PaymentError>,
    requests: Vec<CreateOrderRequest>,
    issued: u32,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway that rejects every order.
    pub fn failing(error: PaymentError) -> Self {
        let mock = Self::new();
        mock.state().fail_all = Some(error);
        mock
    }

    /// Fails only the next `create_order` call.
    pub fn set_next_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<CreateOrderRequest> {
        self.state().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().requests.len()
    }

    pub fn last_request(&self) -> Option<CreateOrderRequest> {
        self.state().requests.last().cloned()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().expect("MockPaymentGateway: lock poisoned")
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, PaymentError> {
        let mut state = self.state();
        state.requests.push(request.clone());

        if let Some(err) = state.next_error.take() {
            return Err(err);
        }
        if let Some(err) = &state.fail_all {
            return Err(err.clone());
        }

        state.issued += 1;
        Ok(GatewayOrder {
            id: format!("order_mock_{}", state.issued),
            amount: request.amount.amount_minor(),
            currency: request.amount.currency().as_str().to_string(),
            receipt: Some(request.receipt),
            status: "created".to_string(),
        })
    }

    fn public_key_id(&self) -> String {
        "rzp_test_mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Currency, Money};
    use std::collections::BTreeMap;

    fn request(amount: i64) -> CreateOrderRequest {
        CreateOrderRequest {
            amount: Money::new(amount, Currency::inr()).unwrap(),
            receipt: "rcpt".to_string(),
            notes: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn issues_sequential_orders_echoing_amount() {
        let mock = MockPaymentGateway::new();
        let first = mock.create_order(request(1599)).await.unwrap();
        let second = mock.create_order(request(100)).await.unwrap();

        assert_eq!(first.id, "order_mock_1");
        assert_eq!(first.amount, 1599);
        assert_eq!(second.id, "order_mock_2");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn next_error_applies_once() {
        let mock = MockPaymentGateway::new();
        mock.set_next_error(PaymentError::network("timeout"));

        assert!(mock.create_order(request(1)).await.is_err());
        assert!(mock.create_order(request(1)).await.is_ok());
    }

    #[tokio::test]
    async fn failing_gateway_always_errors() {
        let mock = MockPaymentGateway::failing(PaymentError::provider("down"));
        assert!(mock.create_order(request(1)).await.is_err());
        assert!(mock.create_order(request(1)).await.is_err());
        assert_eq!(mock.call_count(), 2);
    }
}
