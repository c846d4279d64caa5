//! Razorpay HMAC-SHA256 signature verification.
//!
//! Two signatures are checked by this service, each with its own secret:
//!
//! - **Payment signature**: `hex(HMAC(key_secret, order_id + "|" + payment_id))`,
//!   returned to the browser by the checkout widget and posted back to us.
//! - **Webhook signature**: `hex(HMAC(webhook_secret, raw_body))`, sent by the
//!   gateway in the `X-Razorpay-Signature` header.
//!
//! Webhook signatures are always computed over the raw request bytes. Parsing
//! and re-serialising the JSON would change key order or whitespace and break
//! verification of genuine events.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes `hex(HMAC-SHA256(secret, message))`.
pub fn compute_signature_hex(secret: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Builds the message signed for a checkout payment.
pub fn payment_signature_payload(order_id: &str, payment_id: &str) -> String {
    format!("{}|{}", order_id, payment_id)
}

/// Verifies checkout payment signatures with the gateway key secret.
#[derive(Clone)]
pub struct PaymentSignatureVerifier {
    key_secret: SecretString,
}

impl PaymentSignatureVerifier {
    /// Creates a verifier from the gateway key secret.
    pub fn new(key_secret: SecretString) -> Self {
        Self { key_secret }
    }

    /// Returns true when `signature` matches the expected HMAC for the pair.
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let expected = compute_signature_hex(
            self.key_secret.expose_secret().as_bytes(),
            payment_signature_payload(order_id, payment_id).as_bytes(),
        );
        constant_time_compare(expected.as_bytes(), signature.as_bytes())
    }
}

impl std::fmt::Debug for PaymentSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentSignatureVerifier").finish_non_exhaustive()
    }
}

/// Verifies webhook signatures with the webhook secret.
#[derive(Clone)]
pub struct WebhookSignatureVerifier {
    webhook_secret: SecretString,
}

impl WebhookSignatureVerifier {
    /// Creates a verifier from the webhook secret configured in the gateway dashboard.
    pub fn new(webhook_secret: SecretString) -> Self {
        Self { webhook_secret }
    }

    /// Returns true when `signature` matches the HMAC of the raw body.
    pub fn verify(&self, raw_body: &[u8], signature: &str) -> bool {
        let expected =
            compute_signature_hex(self.webhook_secret.expose_secret().as_bytes(), raw_body);
        constant_time_compare(expected.as_bytes(), signature.as_bytes())
    }
}

impl std::fmt::Debug for WebhookSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSignatureVerifier").finish_non_exhaustive()
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// Length is not secret (always 64 hex chars for a valid signature), so a
/// length mismatch returns early.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
