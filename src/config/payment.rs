//! Payment configuration (Razorpay)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::error::ValidationError;
use super::server::{split_list, Environment};

const MAX_RETRIES: u32 = 10;
const MAX_INITIAL_DELAY_MS: u64 = 60_000;

/// Payment configuration (Razorpay)
///
/// Secrets are held as `SecretString` and never appear in `Debug` output.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Public key id (`rzp_test_...` / `rzp_live_...`)
    pub razorpay_key_id: String,

    /// Key secret; signs checkout callbacks and authenticates API calls
    pub razorpay_key_secret: SecretString,

    /// Secret configured on the webhook in the Razorpay dashboard
    pub razorpay_webhook_secret: SecretString,

    /// ISO 4217 currency for created orders
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout for gateway calls in seconds
    #[serde(default = "default_gateway_timeout")]
    pub gateway_timeout_secs: u64,

    /// Retries after the first attempt for transient gateway failures
    #[serde(default = "default_retry_max_retries")]
    pub retry_max_retries: u32,

    /// Delay before the first retry; doubled for each further retry
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,

    /// Comma-separated allow-list of webhook redirect origins.
    /// Unset accepts any http(s) `Origin`.
    pub redirect_origins: Option<String>,
}

impl PaymentConfig {
    pub fn is_test_mode(&self) -> bool {
        self.razorpay_key_id.starts_with("rzp_test_")
    }

    pub fn is_live_mode(&self) -> bool {
        self.razorpay_key_id.starts_with("rzp_live_")
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }

    pub fn retry_initial_delay(&self) -> Duration {
        Duration::from_millis(self.retry_initial_delay_ms)
    }

    /// Redirect allow-list, or `None` when unrestricted.
    pub fn redirect_origins_list(&self) -> Option<Vec<String>> {
        self.redirect_origins
            .as_deref()
            .map(|s| split_list(Some(s)))
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.razorpay_key_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__RAZORPAY_KEY_ID"));
        }
        if self.razorpay_key_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__RAZORPAY_KEY_SECRET"));
        }
        if self.razorpay_webhook_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT__RAZORPAY_WEBHOOK_SECRET",
            ));
        }
        if !self.razorpay_key_id.starts_with("rzp_") {
            return Err(ValidationError::InvalidRazorpayKeyId);
        }

        if self.currency.len() != 3 || !self.currency.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency);
        }

        let base = Url::parse(&self.api_base_url).map_err(|_| ValidationError::InvalidApiBaseUrl)?;
        match base.scheme() {
            "https" => {}
            "http" if *environment != Environment::Production => {}
            "http" => return Err(ValidationError::ApiBaseUrlMustBeHttps),
            _ => return Err(ValidationError::InvalidApiBaseUrl),
        }
        if self.gateway_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.retry_max_retries > MAX_RETRIES {
            return Err(ValidationError::TooManyRetries);
        }
        if self.retry_initial_delay_ms > MAX_INITIAL_DELAY_MS {
            return Err(ValidationError::RetryDelayTooLarge);
        }

        for origin in self.redirect_origins_list().unwrap_or_default() {
            let valid = Url::parse(&origin)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
                .unwrap_or(false);
            if !valid {
                return Err(ValidationError::InvalidRedirectOrigin(origin));
            }
        }

        Ok(())
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_api_base_url() -> String {
    "https://api.razorpay.com".to_string()
}

fn default_gateway_timeout() -> u64 {
    10
}

fn default_retry_max_retries() -> u32 {
    3
}

fn default_retry_initial_delay_ms() -> u64 {
    1000
}
