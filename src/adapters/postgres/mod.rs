//! PostgreSQL adapters.
//!
//! Both tables are keyed by the gateway order id and written with
//! `INSERT ... ON CONFLICT DO UPDATE`. Schema lives in `migrations/`.

mod payment_record_repository;
mod webhook_payment_repository;

pub use payment_record_repository::PostgresPaymentRecordRepository;
pub use webhook_payment_repository::PostgresWebhookPaymentRepository;
