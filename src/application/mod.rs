//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Cross-cutting execution policies (retry with backoff, best-effort writes)
//! live here so handlers can state them explicitly.

pub mod best_effort;
pub mod handlers;
pub mod retry;

pub use best_effort::{best_effort, BestEffortOutcome};
pub use handlers::{
    CreateOrderCommand, CreateOrderHandler, HandleWebhookCommand, HandleWebhookHandler,
    VerifyPaymentCommand, VerifyPaymentHandler, VerifyPaymentResult, WebhookReply,
};
pub use retry::{BackoffExecutor, RetryPolicy, Sleeper, TokioSleeper, Transient};
