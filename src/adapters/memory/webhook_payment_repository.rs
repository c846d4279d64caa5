//! In-memory WebhookPaymentRepository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, OrderId, Timestamp};
use crate::domain::payment::{WebhookPaymentRecord, WebhookPaymentUpdate};
use crate::ports::WebhookPaymentRepository;

/// In-memory storage for webhook payment state, keyed by order id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWebhookPaymentRepository {
    records: Arc<RwLock<HashMap<OrderId, WebhookPaymentRecord>>>,
}

impl InMemoryWebhookPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl WebhookPaymentRepository for InMemoryWebhookPaymentRepository {
    async fn upsert(
        &self,
        update: WebhookPaymentUpdate,
    ) -> Result<WebhookPaymentRecord, DomainError> {
        let mut records = self.records.write().await;
        let existing = records.get(&update.order_id).cloned();
        let record = WebhookPaymentRecord::merge(existing, update, Timestamp::now());
        records.insert(record.order_id.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_order_id(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<WebhookPaymentRecord>, DomainError> {
        Ok(self.records.read().await.get(order_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PaymentId;
    use crate::domain::payment::{MinorUnits, PaymentStatus};

    fn update(status: &str) -> WebhookPaymentUpdate {
        WebhookPaymentUpdate {
            order_id: OrderId::new("order_1").unwrap(),
            payment_id: None,
            amount: None,
            currency: Some("INR".to_string()),
            status: PaymentStatus::from(status),
            method: None,
        }
    }

    #[tokio::test]
    async fn last_write_wins_and_created_at_is_kept() {
        let repo = InMemoryWebhookPaymentRepository::new();

        let first = repo.upsert(update("authorized")).await.unwrap();
        let second = repo.upsert(update("captured")).await.unwrap();

        assert_eq!(repo.len().await, 1);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.status, PaymentStatus::Captured);
    }

    #[tokio::test]
    async fn partial_delivery_keeps_stored_fields() {
        let repo = InMemoryWebhookPaymentRepository::new();
        repo.upsert(WebhookPaymentUpdate {
            payment_id: Some(PaymentId::new("pay_1").unwrap()),
            amount: Some(MinorUnits::new(50_000)),
            method: Some("upi".to_string()),
            ..update("authorized")
        })
        .await
        .unwrap();

        let stored = repo
            .upsert(WebhookPaymentUpdate {
                currency: None,
                ..update("captured")
            })
            .await
            .unwrap();

        assert_eq!(stored.status, PaymentStatus::Captured);
        assert_eq!(stored.payment_id.unwrap().as_str(), "pay_1");
        assert_eq!(stored.amount, Some(MinorUnits::new(50_000)));
        assert_eq!(stored.currency.as_deref(), Some("INR"));
        assert_eq!(stored.method.as_deref(), Some("upi"));
    }

    #[tokio::test]
    async fn concurrent_duplicate_deliveries_leave_one_record() {
        let repo = InMemoryWebhookPaymentRepository::new();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.upsert(update("captured")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(repo.len().await, 1);
    }
}
