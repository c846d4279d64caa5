//! VerifyPaymentHandler - Checks the checkout signature posted back by the browser.

use std::sync::Arc;

use serde::Serialize;

use crate::application::best_effort::best_effort;
use crate::domain::foundation::{OrderId, PaymentId};
use crate::domain::payment::{PaymentError, PaymentSignatureVerifier, PaymentVerificationUpdate};
use crate::ports::PaymentRecordRepository;

/// Command carrying the three values the checkout widget hands the browser.
#[derive(Debug, Clone, Default)]
pub struct VerifyPaymentCommand {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
}

/// Verification outcome. `success` is always true; a signature mismatch is
/// reported through `verified`, not as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerifyPaymentResult {
    pub success: bool,
    pub verified: bool,
}

/// Handler for payment signature verification.
pub struct VerifyPaymentHandler {
    verifier: PaymentSignatureVerifier,
    records: Arc<dyn PaymentRecordRepository>,
}

impl VerifyPaymentHandler {
    pub fn new(
        verifier: PaymentSignatureVerifier,
        records: Arc<dyn PaymentRecordRepository>,
    ) -> Self {
        Self { verifier, records }
    }

    pub async fn handle(&self, cmd: VerifyPaymentCommand) -> Result<VerifyPaymentResult, PaymentError> {
        let order_id = required(cmd.order_id, "razorpay_order_id")?;
        let payment_id = required(cmd.payment_id, "razorpay_payment_id")?;
        let signature = required(cmd.signature, "razorpay_signature")?;

        let order_id = OrderId::new(order_id)
            .map_err(|e| PaymentError::invalid_argument(e.to_string()))?;
        let payment_id = PaymentId::new(payment_id)
            .map_err(|e| PaymentError::invalid_argument(e.to_string()))?;

        let verified = self
            .verifier
            .verify(order_id.as_str(), payment_id.as_str(), &signature);

        if verified {
            tracing::info!(order_id = %order_id, payment_id = %payment_id, "Payment signature verified");
        } else {
            tracing::warn!(order_id = %order_id, payment_id = %payment_id, "Payment signature mismatch");
        }

        // The outcome is reported whether or not the record could be stored.
        best_effort(
            "payment_record_upsert",
            self.records.upsert_verification(PaymentVerificationUpdate {
                order_id,
                payment_id,
                verified,
            }),
        )
        .await;

        Ok(VerifyPaymentResult {
            success: true,
            verified,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, PaymentError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(PaymentError::invalid_argument(format!(
            "Missing required field: {}",
            field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPaymentRecordRepository;
    use crate::domain::foundation::DomainError;
    use crate::domain::payment::{compute_signature_hex, payment_signature_payload, PaymentRecord};
    use async_trait::async_trait;
    use secrecy::SecretString;

    const KEY_SECRET: &str = "test_key_secret";

    struct FailingRepository;

    #[async_trait]
    impl PaymentRecordRepository for FailingRepository {
        async fn upsert_verification(
            &self,
            _update: PaymentVerificationUpdate,
        ) -> Result<PaymentRecord, DomainError> {
            Err(DomainError::database("connection refused"))
        }

        async fn find_by_order_id(
            &self,
            _order_id: &OrderId,
        ) -> Result<Option<PaymentRecord>, DomainError> {
            Ok(None)
        }
    }

    struct PanickingRepository;

    #[async_trait]
    impl PaymentRecordRepository for PanickingRepository {
        async fn upsert_verification(
            &self,
            _update: PaymentVerificationUpdate,
        ) -> Result<PaymentRecord, DomainError> {
            panic!("driver bug")
        }

        async fn find_by_order_id(
            &self,
            _order_id: &OrderId,
        ) -> Result<Option<PaymentRecord>, DomainError> {
            Ok(None)
        }
    }

    fn sign(order_id: &str, payment_id: &str) -> String {
        compute_signature_hex(
            KEY_SECRET.as_bytes(),
            payment_signature_payload(order_id, payment_id).as_bytes(),
        )
    }

    fn handler(records: Arc<dyn PaymentRecordRepository>) -> VerifyPaymentHandler {
        VerifyPaymentHandler::new(
            PaymentSignatureVerifier::new(SecretString::new(KEY_SECRET.to_string())),
            records,
        )
    }

    fn command(order_id: &str, payment_id: &str, signature: &str) -> VerifyPaymentCommand {
        VerifyPaymentCommand {
            order_id: Some(order_id.to_string()),
            payment_id: Some(payment_id.to_string()),
            signature: Some(signature.to_string()),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn valid_signature_is_verified_and_recorded() {
        let repo = Arc::new(InMemoryPaymentRecordRepository::new());
        let sig = sign("order_1", "pay_1");

        let result = handler(repo.clone())
            .handle(command("order_1", "pay_1", &sig))
            .await
            .unwrap();

        assert_eq!(result, VerifyPaymentResult { success: true, verified: true });
        let record = repo
            .find_by_order_id(&OrderId::new("order_1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(record.verified);
        assert_eq!(record.payment_id.unwrap().as_str(), "pay_1");
    }

    #[tokio::test]
    async fn wrong_signature_is_a_successful_unverified_response() {
        let repo = Arc::new(InMemoryPaymentRecordRepository::new());

        let result = handler(repo.clone())
            .handle(command("order_1", "pay_1", "deadbeef"))
            .await
            .unwrap();

        assert_eq!(result, VerifyPaymentResult { success: true, verified: false });
        let record = repo
            .find_by_order_id(&OrderId::new("order_1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(!record.verified);
    }

    #[tokio::test]
    async fn repeated_attempts_update_a_single_record() {
        let repo = Arc::new(InMemoryPaymentRecordRepository::new());
        let handler = handler(repo.clone());
        let sig = sign("order_1", "pay_1");

        handler.handle(command("order_1", "pay_1", "bad")).await.unwrap();
        handler.handle(command("order_1", "pay_1", &sig)).await.unwrap();

        assert_eq!(repo.len().await, 1);
        let record = repo
            .find_by_order_id(&OrderId::new("order_1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(record.verified);
    }

    // ══════════════════════════════════════════════════════════════
    // Validation Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_or_empty_fields_are_invalid_arguments() {
        let repo = Arc::new(InMemoryPaymentRecordRepository::new());
        let handler = handler(repo.clone());

        let cases = vec![
            VerifyPaymentCommand::default(),
            VerifyPaymentCommand {
                order_id: None,
                ..command("order_1", "pay_1", "sig")
            },
            command("", "pay_1", "sig"),
            command("order_1", "", "sig"),
            command("order_1", "pay_1", ""),
        ];

        for cmd in cases {
            let result = handler.handle(cmd).await;
            assert!(matches!(result, Err(PaymentError::InvalidArgument(_))));
        }
        assert_eq!(repo.len().await, 0);
    }

    #[tokio::test]
    async fn blank_but_present_ids_are_checked_not_rejected() {
        let repo = Arc::new(InMemoryPaymentRecordRepository::new());
        let handler = handler(repo.clone());

        let result = handler
            .handle(command("   ", "pay_1", "deadbeef"))
            .await
            .unwrap();

        assert!(result.success);
        assert!(!result.verified);
        assert_eq!(repo.len().await, 1);
    }

    // ══════════════════════════════════════════════════════════════
    // Best-Effort Persistence Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn persistence_failure_does_not_change_outcome() {
        let sig = sign("order_1", "pay_1");

        let result = handler(Arc::new(FailingRepository))
            .handle(command("order_1", "pay_1", &sig))
            .await
            .unwrap();

        assert_eq!(result, VerifyPaymentResult { success: true, verified: true });
    }

    #[tokio::test]
    async fn persistence_panic_does_not_change_outcome() {
        let result = handler(Arc::new(PanickingRepository))
            .handle(command("order_1", "pay_1", "nope"))
            .await
            .unwrap();

        assert_eq!(result, VerifyPaymentResult { success: true, verified: false });
    }
}
