//! In-memory PaymentRecordRepository.
//!
//! Used by tests and by local runs without a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, OrderId, Timestamp};
use crate::domain::payment::{PaymentRecord, PaymentVerificationUpdate};
use crate::ports::PaymentRecordRepository;

/// In-memory storage for verification records, keyed by order id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentRecordRepository {
    records: Arc<RwLock<HashMap<OrderId, PaymentRecord>>>,
}

impl InMemoryPaymentRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentRecordRepository for InMemoryPaymentRecordRepository {
    async fn upsert_verification(
        &self,
        update: PaymentVerificationUpdate,
    ) -> Result<PaymentRecord, DomainError> {
        let mut records = self.records.write().await;
        let existing = records.get(&update.order_id).cloned();
        let record = PaymentRecord::merge(existing, update, Timestamp::now());
        records.insert(record.order_id.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_order_id(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self.records.read().await.get(order_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PaymentId;

    fn update(order: &str, payment: &str, verified: bool) -> PaymentVerificationUpdate {
        PaymentVerificationUpdate {
            order_id: OrderId::new(order).unwrap(),
            payment_id: PaymentId::new(payment).unwrap(),
            verified,
        }
    }

    #[tokio::test]
    async fn upsert_creates_then_merges() {
        let repo = InMemoryPaymentRecordRepository::new();

        let first = repo.upsert_verification(update("order_1", "pay_1", false)).await.unwrap();
        let second = repo.upsert_verification(update("order_1", "pay_2", true)).await.unwrap();

        assert_eq!(repo.len().await, 1);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.verified);
        assert_eq!(second.payment_id.unwrap().as_str(), "pay_2");
    }

    #[tokio::test]
    async fn different_orders_are_independent() {
        let repo = InMemoryPaymentRecordRepository::new();

        repo.upsert_verification(update("order_1", "pay_1", true)).await.unwrap();
        repo.upsert_verification(update("order_2", "pay_2", false)).await.unwrap();

        assert_eq!(repo.len().await, 2);
        let first = repo
            .find_by_order_id(&OrderId::new("order_1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(first.verified);
    }

    #[tokio::test]
    async fn find_unknown_order_returns_none() {
        let repo = InMemoryPaymentRecordRepository::new();
        let found = repo
            .find_by_order_id(&OrderId::new("order_missing").unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
        assert!(repo.is_empty().await);
    }
}
