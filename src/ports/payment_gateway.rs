//! PaymentGateway port - Interface for the hosted payment gateway.
//!
//! The gateway owns orders: this service only asks it to create one and
//! hands the result back to the storefront untouched. Signature checks and
//! webhook parsing happen locally and need no gateway round trip.
//!
//! # Example
//!
//! ```ignore
//! let order = gateway
//!     .create_order(CreateOrderRequest::new(MinorUnits::new(50_000), "INR"))
//!     .await?;
//! ```

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::payment::MinorUnits;

/// Port for order creation at the payment gateway.
///
/// Implementations must be safe to call concurrently.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for the given amount in minor units.
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, GatewayError>;
}

/// Request to create a gateway order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateOrderRequest {
    /// Amount in the currency's minor unit (paise for INR).
    pub amount: MinorUnits,

    /// ISO 4217 currency code.
    pub currency: String,
}

impl CreateOrderRequest {
    pub fn new(amount: MinorUnits, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

/// Order as returned by the gateway.
///
/// Fields this service does not interpret are kept in `extra` so the order
/// can be returned to the caller exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order id (`order_...`).
    pub id: String,

    pub amount: u64,

    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Categorization of gateway failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayErrorCode {
    /// The gateway reported an internal failure (`SERVER_ERROR` or a 5xx).
    ServerError,

    /// The gateway rejected the request (`BAD_REQUEST_ERROR`).
    BadRequest,

    /// Key id or secret rejected.
    Authentication,

    /// Too many requests.
    RateLimited,

    /// Connection could not be established or was interrupted.
    Network,

    /// The response could not be decoded.
    InvalidResponse,

    /// Anything else.
    Unknown,
}

impl GatewayErrorCode {
    /// Returns true for the one failure class the backoff executor retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayErrorCode::ServerError)
    }

    /// Maps a gateway `error.code` string to a category.
    pub fn from_gateway_code(code: &str) -> Self {
        match code {
            "SERVER_ERROR" => GatewayErrorCode::ServerError,
            "BAD_REQUEST_ERROR" => GatewayErrorCode::BadRequest,
            _ => GatewayErrorCode::Unknown,
        }
    }
}

impl fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GatewayErrorCode::ServerError => "server_error",
            GatewayErrorCode::BadRequest => "bad_request",
            GatewayErrorCode::Authentication => "authentication_error",
            GatewayErrorCode::RateLimited => "rate_limited",
            GatewayErrorCode::Network => "network_error",
            GatewayErrorCode::InvalidResponse => "invalid_response",
            GatewayErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Gateway operation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    /// Error category.
    pub code: GatewayErrorCode,

    /// Human-readable message, usually the gateway's `description`.
    pub message: String,

    /// Raw gateway error code (if available).
    pub gateway_code: Option<String>,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            gateway_code: None,
        }
    }

    pub fn with_gateway_code(mut self, code: impl Into<String>) -> Self {
        self.gateway_code = Some(code.into());
        self
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ServerError, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::BadRequest, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Network, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    pub fn is_transient(&self) -> bool {
        self.code.is_transient()
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(code) = &self.gateway_code {
            write!(f, " ({})", code)?;
        }
        Ok(())
    }
}

impl std::error::Error for GatewayError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_server_error_is_transient() {
        assert!(GatewayErrorCode::ServerError.is_transient());
        assert!(!GatewayErrorCode::BadRequest.is_transient());
        assert!(!GatewayErrorCode::Authentication.is_transient());
        assert!(!GatewayErrorCode::RateLimited.is_transient());
        assert!(!GatewayErrorCode::Network.is_transient());
        assert!(!GatewayErrorCode::InvalidResponse.is_transient());
        assert!(!GatewayErrorCode::Unknown.is_transient());
    }

    #[test]
    fn gateway_codes_map_to_categories() {
        assert_eq!(
            GatewayErrorCode::from_gateway_code("SERVER_ERROR"),
            GatewayErrorCode::ServerError
        );
        assert_eq!(
            GatewayErrorCode::from_gateway_code("BAD_REQUEST_ERROR"),
            GatewayErrorCode::BadRequest
        );
        assert_eq!(
            GatewayErrorCode::from_gateway_code("SOMETHING_NEW"),
            GatewayErrorCode::Unknown
        );
    }

    #[test]
    fn error_display_includes_gateway_code() {
        let err = GatewayError::bad_request("amount must be at least INR 1.00")
            .with_gateway_code("BAD_REQUEST_ERROR");
        assert_eq!(
            err.to_string(),
            "bad_request: amount must be at least INR 1.00 (BAD_REQUEST_ERROR)"
        );
    }

    #[test]
    fn gateway_order_keeps_unknown_fields() {
        let raw = json!({
            "id": "order_EKwxwAgItmmXdp",
            "entity": "order",
            "amount": 50000,
            "amount_paid": 0,
            "amount_due": 50000,
            "currency": "INR",
            "receipt": null,
            "status": "created",
            "attempts": 0,
            "notes": [],
            "created_at": 1582628071
        });

        let order: GatewayOrder = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(order.id, "order_EKwxwAgItmmXdp");
        assert_eq!(order.amount, 50_000);
        assert_eq!(order.status.as_deref(), Some("created"));

        assert_eq!(serde_json::to_value(&order).unwrap(), raw);
    }

    #[test]
    fn create_order_request_serializes_minor_units() {
        let req = CreateOrderRequest::new(MinorUnits::new(1999), "INR");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "amount": 1999, "currency": "INR" })
        );
    }

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }
}
