//! HTTP adapter for payment endpoints.
//!
//! Exposes the payment handlers via REST API:
//! - `POST /api/payments/orders` - Create a gateway order
//! - `POST /api/payments/verify` - Verify a checkout signature
//! - `POST /api/webhooks/razorpay` - Handle gateway webhooks
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{PaymentApiError, PaymentsAppState, WebhookApiError, SIGNATURE_HEADER};
pub use routes::{payment_router, payment_routes, payments_app, webhook_routes};
