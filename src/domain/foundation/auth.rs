//! Authentication types for the domain layer.
//!
//! These types represent a storefront customer extracted from a verified
//! identity token. They carry no provider dependencies; any identity provider
//! can populate them through the `SessionValidator` port.

use super::UserId;
use thiserror::Error;

/// Authenticated caller extracted from a validated ID token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The unique user identifier from the identity provider (`sub`).
    pub id: UserId,

    /// Email address, absent for phone or anonymous sign-in.
    pub email: Option<String>,

    /// Whether the identity provider has verified the email.
    pub email_verified: bool,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId, email: Option<String>, email_verified: bool) -> Self {
        Self {
            id,
            email,
            email_verified,
        }
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired (separate from InvalidToken for specific handling).
    #[error("Token expired")]
    TokenExpired,

    /// The identity provider's signing keys could not be obtained.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
