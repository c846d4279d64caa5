//! Firebase Authentication adapter for ID token validation.
//!
//! This adapter implements the `SessionValidator` port for Firebase ID
//! tokens. It validates JWTs by:
//!
//! 1. Fetching Google's securetoken JWKS
//! 2. Validating the RS256 signature against the matching key
//! 3. Validating issuer, audience, and expiry claims
//! 4. Mapping claims to the domain `AuthenticatedUser` type
//!
//! # Security
//!
//! - **Issuer (iss)**: Must be `https://securetoken.google.com/<project_id>`
//! - **Audience (aud)**: Must be the project id
//! - **Expiry (exp)**: Must be in the future
//! - **Subject (sub)**: Must be non-empty; it is the Firebase uid
//!
//! # Example
//!
//! ```ignore
//! let config = FirebaseConfig::new("storefront-prod");
//! let validator = FirebaseSessionValidator::new(config);
//! let user = validator.validate("eyJ...").await?;
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Google's JWKS endpoint for Firebase ID token signing keys.
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Issuer prefix; the project id is appended.
const ISSUER_PREFIX: &str = "https://securetoken.google.com/";

const DEFAULT_JWKS_CACHE: Duration = Duration::from_secs(3600);

/// Configuration for the Firebase adapter.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Firebase project id. Used as the audience and to build the issuer.
    pub project_id: String,

    /// JWKS endpoint (overridable for tests).
    pub jwks_url: String,

    /// How long fetched keys are reused before refetching.
    pub jwks_cache_duration: Duration,
}

impl FirebaseConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            jwks_url: FIREBASE_JWKS_URL.to_string(),
            jwks_cache_duration: DEFAULT_JWKS_CACHE,
        }
    }

    pub fn with_cache_duration(mut self, duration: Duration) -> Self {
        self.jwks_cache_duration = duration;
        self
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    fn issuer(&self) -> String {
        format!("{}{}", ISSUER_PREFIX, self.project_id)
    }
}

/// Claims carried by a Firebase ID token.
#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    email_verified: Option<bool>,
}

/// Cached JWKS with expiry tracking.
struct JwksCache {
    jwks: JwkSet,
    fetched_at: Instant,
    cache_duration: Duration,
}

impl JwksCache {
    fn new(jwks: JwkSet, cache_duration: Duration) -> Self {
        Self {
            jwks,
            fetched_at: Instant::now(),
            cache_duration,
        }
    }

    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.cache_duration
    }
}

/// Firebase ID token validator.
pub struct FirebaseSessionValidator {
    config: FirebaseConfig,
    http_client: reqwest::Client,
    jwks_cache: Arc<RwLock<Option<JwksCache>>>,
}

impl FirebaseSessionValidator {
    /// Keys are fetched lazily on first validation.
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            jwks_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Validator with a pre-loaded key set.
    pub fn with_jwks(config: FirebaseConfig, jwks: JwkSet) -> Self {
        let cache = JwksCache::new(jwks, config.jwks_cache_duration);
        Self {
            config,
            http_client: reqwest::Client::new(),
            jwks_cache: Arc::new(RwLock::new(Some(cache))),
        }
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        tracing::debug!(url = %self.config.jwks_url, "Fetching JWKS");

        let response = self
            .http_client
            .get(&self.config.jwks_url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch JWKS");
                AuthError::service_unavailable(format!("Failed to fetch JWKS: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(%status, "JWKS endpoint returned an error");
            return Err(AuthError::service_unavailable(format!(
                "JWKS endpoint returned {}",
                status
            )));
        }

        response.json::<JwkSet>().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse JWKS");
            AuthError::service_unavailable(format!("Failed to parse JWKS: {}", e))
        })
    }

    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some(ref cached) = *cache {
                if !cached.is_expired() {
                    return Ok(cached.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;

        let mut cache = self.jwks_cache.write().await;
        *cache = Some(JwksCache::new(jwks.clone(), self.config.jwks_cache_duration));

        Ok(jwks)
    }

    fn find_decoding_key(
        &self,
        header: &jsonwebtoken::Header,
        jwks: &JwkSet,
    ) -> Result<DecodingKey, AuthError> {
        if header.alg != Algorithm::RS256 {
            tracing::warn!(alg = ?header.alg, "Unexpected token algorithm");
            return Err(AuthError::InvalidToken);
        }

        let kid = header.kid.as_ref().ok_or_else(|| {
            tracing::warn!("JWT missing 'kid' header");
            AuthError::InvalidToken
        })?;

        let jwk = jwks.find(kid).ok_or_else(|| {
            tracing::warn!(kid = %kid, "No matching key found");
            AuthError::InvalidToken
        })?;

        DecodingKey::from_jwk(jwk).map_err(|e| {
            tracing::warn!(error = %e, "Failed to create decoding key");
            AuthError::InvalidToken
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[&self.config.project_id]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "sub", "aud"]);
        validation
    }
}

#[async_trait]
impl SessionValidator for FirebaseSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode JWT header");
            AuthError::InvalidToken
        })?;

        let jwks = self.get_jwks().await?;
        let decoding_key = self.find_decoding_key(&header, &jwks)?;

        let claims = decode::<FirebaseClaims>(token, &decoding_key, &self.validation())
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => {
                        tracing::warn!(error = %e, "Token validation failed");
                        AuthError::InvalidToken
                    }
                }
            })?
            .claims;

        let user_id = UserId::new(claims.sub).map_err(|_| {
            tracing::warn!("Token has empty subject");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(
            user_id,
            claims.email,
            claims.email_verified.unwrap_or(false),
        ))
    }
}

impl std::fmt::Debug for FirebaseSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseSessionValidator")
            .field("project_id", &self.config.project_id)
            .finish_non_exhaustive()
    }
}
