//! Razorpay payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Razorpay Orders API.
//!
//! # Security
//!
//! - Requests authenticate with HTTP basic auth (key id / key secret)
//! - The key secret is held as `secrecy::SecretString` and never logged
//! - Error messages carry only the gateway's `description`, never credentials
//!
//! # Configuration
//!
//! ```ignore
//! let config = RazorpayConfig::new("rzp_test_123", key_secret);
//! let adapter = RazorpayGatewayAdapter::new(config);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::ports::{CreateOrderRequest, GatewayError, GatewayErrorCode, GatewayOrder, PaymentGateway};

/// Default Razorpay API host.
pub const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com";

/// Razorpay API configuration.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Public key id (rzp_live_... or rzp_test_...).
    key_id: String,

    /// Key secret paired with `key_id`.
    key_secret: SecretString,

    /// Base URL for the API (default: https://api.razorpay.com).
    api_base_url: String,

    /// Per-request timeout.
    request_timeout: Duration,
}

impl RazorpayConfig {
    pub fn new(key_id: impl Into<String>, key_secret: SecretString) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    fn orders_url(&self) -> String {
        format!("{}/v1/orders", self.api_base_url)
    }
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Razorpay error envelope: `{"error": {"code": "...", "description": "..."}}`.
#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayErrorBody,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Razorpay gateway adapter.
pub struct RazorpayGatewayAdapter {
    config: RazorpayConfig,
    http_client: reqwest::Client,
}

impl RazorpayGatewayAdapter {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGatewayAdapter {
    async fn create_order(&self, request: CreateOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let response = self
            .http_client
            .post(self.config.orders_url())
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.expose_secret()))
            .timeout(self.config.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = map_error_response(status, &body);
            tracing::warn!(
                http_status = status.as_u16(),
                code = %error.code,
                gateway_code = error.gateway_code.as_deref().unwrap_or(""),
                "Razorpay create_order failed"
            );
            return Err(error);
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| GatewayError::invalid_response(format!("Failed to parse Razorpay order: {}", e)))
    }
}

/// Maps a non-success response to a `GatewayError`.
///
/// HTTP status wins over the body code for 401, 429 and 5xx.
fn map_error_response(status: StatusCode, body: &str) -> GatewayError {
    let parsed = serde_json::from_str::<RazorpayErrorResponse>(body).ok();
    let gateway_code = parsed.as_ref().and_then(|r| r.error.code.clone());
    let message = parsed
        .and_then(|r| r.error.description)
        .unwrap_or_else(|| format!("Razorpay returned HTTP {}", status.as_u16()));

    let code = if status.is_server_error() {
        GatewayErrorCode::ServerError
    } else if status == StatusCode::UNAUTHORIZED {
        GatewayErrorCode::Authentication
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        GatewayErrorCode::RateLimited
    } else {
        match gateway_code.as_deref().map(GatewayErrorCode::from_gateway_code) {
            Some(GatewayErrorCode::Unknown) | None if status.is_client_error() => {
                GatewayErrorCode::BadRequest
            }
            Some(code) => code,
            None => GatewayErrorCode::Unknown,
        }
    };

    let error = GatewayError::new(code, message);
    match gateway_code {
        Some(c) => error.with_gateway_code(c),
        None => error,
    }
}
