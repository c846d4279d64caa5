//! Razorpay payment gateway adapter.
//!
//! Implements the `PaymentGateway` port for Razorpay order creation.
//! Signature checks do not call the gateway and live in the domain layer.
//!
//! # Configuration
//!
//! Required settings (see `config::PaymentConfig`):
//! - `STOREFRONT_PAYMENTS__PAYMENT__RAZORPAY_KEY_ID`
//! - `STOREFRONT_PAYMENTS__PAYMENT__RAZORPAY_KEY_SECRET`

mod mock_gateway;
mod razorpay_adapter;

pub use mock_gateway::MockPaymentGateway;
pub use razorpay_adapter::{RazorpayConfig, RazorpayGatewayAdapter, DEFAULT_API_BASE_URL};
