//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid bind address")]
    InvalidBindAddress,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("JWKS URL must use HTTPS in production")]
    JwksUrlMustBeHttps,

    #[error("Invalid Razorpay key id format")]
    InvalidRazorpayKeyId,

    #[error("Currency must be a three-letter uppercase ISO 4217 code")]
    InvalidCurrency,

    #[error("Invalid gateway API base URL")]
    InvalidApiBaseUrl,

    #[error("Gateway API base URL must use HTTPS in production")]
    ApiBaseUrlMustBeHttps,

    #[error("Retry count exceeds maximum allowed (10)")]
    TooManyRetries,

    #[error("Retry initial delay exceeds maximum allowed (60000 ms)")]
    RetryDelayTooLarge,

    #[error("Invalid redirect origin: {0}")]
    InvalidRedirectOrigin(String),
}
