//! Mock payment gateway for testing.
//!
//! Provides a configurable `PaymentGateway` for unit and integration tests.
//! Supports:
//! - Queued error injection (one error consumed per call)
//! - Call tracking
//! - Deterministic order ids

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::ports::{CreateOrderRequest, GatewayError, GatewayOrder, PaymentGateway};

/// Mock payment gateway for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentGateway::new();
/// mock.fail_next(GatewayError::server_error("blip"));
///
/// let order = mock.create_order(request).await?; // fails once, then succeeds
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Errors returned by the next calls, in order.
    queued_errors: VecDeque<GatewayError>,

    /// Every request received, including failed ones.
    requests: Vec<CreateOrderRequest>,

    /// Orders successfully returned.
    orders: Vec<GatewayOrder>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Make the next not-yet-failed call return `error`.
    pub fn fail_next(&self, error: GatewayError) {
        self.inner.lock().unwrap().queued_errors.push_back(error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertion Helpers
    // ════════════════════════════════════════════════════════════════════════════

    pub fn create_order_calls(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }

    pub fn create_order_requests(&self) -> Vec<CreateOrderRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn orders_created(&self) -> Vec<GatewayOrder> {
        self.inner.lock().unwrap().orders.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let mut state = self.inner.lock().unwrap();
        state.requests.push(request.clone());

        if let Some(error) = state.queued_errors.pop_front() {
            return Err(error);
        }

        let sequence = state.orders.len() + 1;
        let mut extra = Map::new();
        extra.insert("entity".to_string(), json!("order"));
        extra.insert("amount_paid".to_string(), json!(0));
        extra.insert("amount_due".to_string(), json!(request.amount.value()));
        extra.insert("receipt".to_string(), Value::Null);
        extra.insert("attempts".to_string(), json!(0));

        let order = GatewayOrder {
            id: format!("order_mock{:06}", sequence),
            amount: request.amount.value(),
            currency: request.currency,
            status: Some("created".to_string()),
            extra,
        };
        state.orders.push(order.clone());
        Ok(order)
    }
}
