//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `auth` - Firebase ID token validation
//! - `http` - Axum routes, handlers and middleware
//! - `memory` - In-memory repositories
//! - `postgres` - PostgreSQL repositories
//! - `razorpay` - Razorpay order API client

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod razorpay;

pub use auth::{FirebaseConfig, FirebaseSessionValidator, MockSessionValidator};
pub use memory::{InMemoryPaymentRecordRepository, InMemoryWebhookPaymentRepository};
pub use postgres::{PostgresPaymentRecordRepository, PostgresWebhookPaymentRepository};
pub use razorpay::{MockPaymentGateway, RazorpayConfig, RazorpayGatewayAdapter};
