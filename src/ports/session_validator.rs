//! Session validation port for identity token validation.
//!
//! The storefront signs customers in with a hosted identity provider and
//! sends the resulting ID token as a Bearer token. This port turns that
//! token into an `AuthenticatedUser`.
//!
//! # Security Requirements
//!
//! All implementations MUST validate:
//! - **Signature**: Token must be signed by one of the provider's current keys
//! - **Issuer (iss)**: Token must come from the expected project
//! - **Audience (aud)**: Token must be intended for this project
//! - **Expiry (exp)**: Token must not be expired

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates ID tokens and extracts user identity.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` when signing keys cannot be fetched
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
