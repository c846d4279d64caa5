//! Webhook error types for gateway callback handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and the message that is safe to put on the
//! wire.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The signature header is absent or empty.
    #[error("Missing signature header")]
    MissingSignature,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The body is not JSON or lacks the payment/order entities.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Persisting the payment record failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Any other failure after the request was accepted, including panics.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    /// Returns true if the gateway should redeliver this webhook.
    ///
    /// Only server-side failures are worth a redelivery; a bad signature or
    /// payload will be just as bad next time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Persistence(_) | WebhookError::Internal(_))
    }

    /// Maps the error to an HTTP status code.
    ///
    /// - 4xx: rejected, the gateway does not retry
    /// - 5xx: server error, the gateway retries
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::Persistence(_) | WebhookError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to the caller. Never includes internal details.
    pub fn public_message(&self) -> &'static str {
        match self {
            WebhookError::MissingSignature => "Missing signature",
            WebhookError::InvalidSignature => "Invalid signature",
            WebhookError::MalformedPayload(_) => "Invalid payload",
            WebhookError::Persistence(_) | WebhookError::Internal(_) => "Internal server error",
        }
    }
}
