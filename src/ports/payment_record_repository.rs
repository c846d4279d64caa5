//! PaymentRecordRepository port - Persistence for checkout verification outcomes.
//!
//! One record per gateway order id. Writes are upserts: the first
//! verification creates the record, later ones overwrite `payment_id`,
//! `verified` and the timestamps while `created_at` is kept.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::payment::{PaymentRecord, PaymentVerificationUpdate};

/// Repository port for `PaymentRecord` persistence.
#[async_trait]
pub trait PaymentRecordRepository: Send + Sync {
    /// Merge a verification outcome into the record keyed by its order id.
    ///
    /// Returns the record as stored after the merge.
    async fn upsert_verification(
        &self,
        update: PaymentVerificationUpdate,
    ) -> Result<PaymentRecord, DomainError>;

    /// Find the record for an order, if one was ever written.
    async fn find_by_order_id(&self, order_id: &OrderId)
        -> Result<Option<PaymentRecord>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_record_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PaymentRecordRepository) {}
    }
}
