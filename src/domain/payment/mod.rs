//! Payment domain module.
//!
//! Order amounts, signature verification, persisted payment records and
//! webhook payload handling for the storefront checkout.
//!
//! # Module Structure
//!
//! - `amount` - major to minor unit conversion
//! - `signature` - HMAC-SHA256 payment and webhook signatures
//! - `records` - `PaymentRecord` / `WebhookPaymentRecord` and merge rules
//! - `status` - gateway payment status
//! - `webhook_payload` - webhook body parsing
//! - `errors` / `webhook_errors` - error taxonomies

mod amount;
mod errors;
mod records;
mod signature;
mod status;
mod webhook_errors;
mod webhook_payload;

pub use amount::MinorUnits;
pub use errors::{ErrorSource, PaymentError};
pub use records::{
    PaymentRecord, PaymentVerificationUpdate, WebhookPaymentRecord, WebhookPaymentUpdate,
};
pub use signature::{
    compute_signature_hex, payment_signature_payload, PaymentSignatureVerifier,
    WebhookSignatureVerifier,
};
pub use status::PaymentStatus;
pub use webhook_errors::WebhookError;
pub use webhook_payload::{parse_webhook_payload, ParsedWebhook};
