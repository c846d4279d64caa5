//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentGateway` - Order creation at the hosted payment gateway
//! - `PaymentRecordRepository` - Checkout verification outcomes
//! - `WebhookPaymentRepository` - Gateway-reported payment state
//! - `SessionValidator` - Identity token validation

mod payment_gateway;
mod payment_record_repository;
mod session_validator;
mod webhook_payment_repository;

pub use payment_gateway::{
    CreateOrderRequest, GatewayError, GatewayErrorCode, GatewayOrder, PaymentGateway,
};
pub use payment_record_repository::PaymentRecordRepository;
pub use session_validator::SessionValidator;
pub use webhook_payment_repository::WebhookPaymentRepository;
