//! Payment command handlers.

mod create_order;
mod handle_webhook;
mod verify_payment;

pub use create_order::{CreateOrderCommand, CreateOrderHandler};
pub use handle_webhook::{
    HandleWebhookCommand, HandleWebhookHandler, WebhookReply, PAYMENT_FAILED_PATH,
    PAYMENT_SUCCESS_PATH,
};
pub use verify_payment::{VerifyPaymentCommand, VerifyPaymentHandler, VerifyPaymentResult};
