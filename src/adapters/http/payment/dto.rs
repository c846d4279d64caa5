//! HTTP DTOs for payment endpoints.
//!
//! Field names follow what the checkout widget hands back to the browser,
//! so the storefront can forward them without renaming.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::handlers::payment::VerifyPaymentCommand;
use crate::domain::payment::PaymentError;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create an order.
///
/// `amount` is kept as raw JSON so a non-numeric value is reported as an
/// invalid argument instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub amount: Option<Value>,
}

impl CreateOrderRequest {
    /// Amount in major units. `null` and absent both mean "not sent".
    pub fn amount(&self) -> Result<Option<f64>, PaymentError> {
        match &self.amount {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| PaymentError::invalid_argument("Amount must be a number")),
            Some(_) => Err(PaymentError::invalid_argument("Amount must be a number")),
        }
    }
}

/// Request to verify a completed checkout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
}

impl From<VerifyPaymentRequest> for VerifyPaymentCommand {
    fn from(req: VerifyPaymentRequest) -> Self {
        VerifyPaymentCommand {
            order_id: req.razorpay_order_id,
            payment_id: req.razorpay_payment_id,
            signature: req.razorpay_signature,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Error body for the RPC endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorResponse {
    pub code: String,
    pub message: String,
}

impl RpcErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Body of every non-redirect webhook response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
}

impl WebhookResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Health check body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
