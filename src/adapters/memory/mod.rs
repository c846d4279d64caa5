//! In-memory repository adapters for tests and database-less local runs.

mod payment_record_repository;
mod webhook_payment_repository;

pub use payment_record_repository::InMemoryPaymentRecordRepository;
pub use webhook_payment_repository::InMemoryWebhookPaymentRepository;
