//! Authentication configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Firebase ID token validation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Firebase project id; tokens must name it as audience and issuer suffix.
    pub firebase_project_id: String,

    /// JWKS cache TTL in seconds
    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,

    /// Override for the signing key endpoint (emulators, tests).
    pub jwks_url: Option<String>,
}

impl AuthConfig {
    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }

    /// Validate authentication configuration
    ///
    /// A JWKS override must use HTTPS in production.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.firebase_project_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__FIREBASE_PROJECT_ID"));
        }
        if let Some(url) = &self.jwks_url {
            if *environment == Environment::Production && !url.starts_with("https://") {
                return Err(ValidationError::JwksUrlMustBeHttps);
            }
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            firebase_project_id: String::new(),
            jwks_cache_ttl_secs: default_jwks_cache_ttl(),
            jwks_url: None,
        }
    }
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.jwks_cache_ttl(), Duration::from_secs(3600));
        assert!(config.jwks_url.is_none());
    }

    #[test]
    fn test_validation_requires_project_id() {
        let config = AuthConfig::default();
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_plain_http_jwks_allowed_outside_production() {
        let config = AuthConfig {
            firebase_project_id: "shop-dev".to_string(),
            jwks_url: Some("http://localhost:9099/jwks".to_string()),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Development).is_ok());
        assert!(config.validate(&Environment::Production).is_err());
    }
}
