//! Payment RPC error taxonomy.
//!
//! Errors returned by order creation and payment verification. The codes match
//! the callable-function codes the storefront client already understands.
//!
//! | Error | Code | HTTP Status |
//! |-------|------|-------------|
//! | Unauthenticated | `unauthenticated` | 401 |
//! | InvalidArgument | `invalid-argument` | 400 |
//! | Internal | `internal` | 500 |

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed underlying cause kept for diagnostics.
pub type ErrorSource = Box<dyn StdError + Send + Sync + 'static>;

/// Errors surfaced to RPC callers of the payment handlers.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The caller is not signed in.
    #[error("{0}")]
    Unauthenticated(String),

    /// Bad or missing input. Never retried.
    #[error("{0}")]
    InvalidArgument(String),

    /// Upstream or unexpected failure.
    ///
    /// `source` carries the underlying error (e.g. the gateway error after
    /// retries were exhausted) for logs; it never contains credentials.
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<ErrorSource>,
    },
}

impl PaymentError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        PaymentError::Unauthenticated(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        PaymentError::InvalidArgument(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PaymentError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error that keeps its underlying cause.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        PaymentError::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the wire code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::Unauthenticated(_) => "unauthenticated",
            PaymentError::InvalidArgument(_) => "invalid-argument",
            PaymentError::Internal { .. } => "internal",
        }
    }

    /// Returns true for caller mistakes that should not be logged as failures.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PaymentError::Internal { .. })
    }
}
