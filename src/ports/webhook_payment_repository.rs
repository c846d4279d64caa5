//! WebhookPaymentRepository port - Persistence for gateway-reported payment state.
//!
//! The gateway may deliver the same webhook more than once and in any order,
//! so writes are last-write-wins upserts keyed by order id.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::payment::{WebhookPaymentRecord, WebhookPaymentUpdate};

/// Repository port for `WebhookPaymentRecord` persistence.
#[async_trait]
pub trait WebhookPaymentRepository: Send + Sync {
    /// Merge a webhook delivery into the record keyed by its order id.
    async fn upsert(&self, update: WebhookPaymentUpdate)
        -> Result<WebhookPaymentRecord, DomainError>;

    /// Find the record for an order.
    async fn find_by_order_id(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<WebhookPaymentRecord>, DomainError>;
}
