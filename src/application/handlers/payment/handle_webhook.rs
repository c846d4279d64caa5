//! HandleWebhookHandler - Processes payment webhooks sent by the gateway.
//!
//! Flow: signature header present → HMAC over the raw body matches →
//! payload has payment and order entities → record upserted → reply chosen
//! from the payment status. Any failure before the upsert leaves the store
//! untouched.

use std::sync::Arc;

use url::form_urlencoded;
use url::Url;

use crate::domain::payment::{
    parse_webhook_payload, PaymentStatus, WebhookError, WebhookSignatureVerifier,
};
use crate::ports::WebhookPaymentRepository;

/// Path the storefront serves after a captured payment.
pub const PAYMENT_SUCCESS_PATH: &str = "/payment-success";

/// Path the storefront serves after a failed payment.
pub const PAYMENT_FAILED_PATH: &str = "/payment-failed";

/// Transport-independent view of a webhook request.
#[derive(Debug, Clone)]
pub struct HandleWebhookCommand {
    /// Value of the signature header, if sent.
    pub signature: Option<String>,
    /// Value of the `Origin` header, if sent.
    pub origin: Option<String>,
    /// Body exactly as received.
    pub raw_body: Vec<u8>,
}

/// What the transport should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookReply {
    /// 302 to the storefront landing page.
    Redirect { location: String },
    /// 200 with `{ success: true, message }`.
    Acknowledged { message: String },
}

/// Handler for gateway webhooks.
pub struct HandleWebhookHandler {
    verifier: WebhookSignatureVerifier,
    repository: Arc<dyn WebhookPaymentRepository>,
    allowed_origins: Option<Vec<String>>,
}

impl HandleWebhookHandler {
    pub fn new(
        verifier: WebhookSignatureVerifier,
        repository: Arc<dyn WebhookPaymentRepository>,
    ) -> Self {
        Self {
            verifier,
            repository,
            allowed_origins: None,
        }
    }

    /// Restrict redirect origins. Origins not listed are treated as absent.
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = Some(
            origins
                .iter()
                .filter_map(|o| normalize_origin(o))
                .collect(),
        );
        self
    }

    pub async fn handle(&self, cmd: HandleWebhookCommand) -> Result<WebhookReply, WebhookError> {
        let signature = cmd
            .signature
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(WebhookError::MissingSignature)?;

        if !self.verifier.verify(&cmd.raw_body, signature) {
            tracing::warn!("Webhook signature mismatch");
            return Err(WebhookError::InvalidSignature);
        }

        let parsed = parse_webhook_payload(&cmd.raw_body).map_err(|err| {
            tracing::warn!(error = %err, "Rejected webhook payload");
            err
        })?;

        let order_id = parsed.update.order_id.clone();
        let status = parsed.update.status.clone();

        self.repository.upsert(parsed.update).await.map_err(|err| {
            tracing::error!(order_id = %order_id, error = %err, "Failed to persist webhook payment");
            WebhookError::Persistence(err.to_string())
        })?;

        tracing::info!(
            order_id = %order_id,
            status = %status,
            event = parsed.event.as_deref().unwrap_or("unknown"),
            "Webhook payment recorded"
        );

        let reply = match status {
            PaymentStatus::Captured => WebhookReply::Redirect {
                location: self.landing_url(cmd.origin.as_deref(), PAYMENT_SUCCESS_PATH, order_id.as_str()),
            },
            PaymentStatus::Failed => WebhookReply::Redirect {
                location: self.landing_url(cmd.origin.as_deref(), PAYMENT_FAILED_PATH, order_id.as_str()),
            },
            other => WebhookReply::Acknowledged {
                message: format!("Webhook processed for payment status {}", other),
            },
        };

        Ok(reply)
    }

    fn landing_url(&self, origin: Option<&str>, path: &str, order_id: &str) -> String {
        let base = origin
            .and_then(normalize_origin)
            .filter(|o| match &self.allowed_origins {
                Some(allowed) => allowed.iter().any(|a| a == o),
                None => true,
            })
            .unwrap_or_default();

        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("order_id", order_id)
            .finish();

        format!("{}{}?{}", base, path, query)
    }
}

/// Reduces an `Origin` value to `scheme://host[:port]`, or `None` if it is
/// not an http(s) origin.
fn normalize_origin(origin: &str) -> Option<String> {
    let url = Url::parse(origin.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Some(url.origin().ascii_serialization()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryWebhookPaymentRepository;
    use crate::domain::foundation::{DomainError, OrderId};
    use crate::domain::payment::{
        compute_signature_hex, WebhookPaymentRecord, WebhookPaymentUpdate,
    };
    use async_trait::async_trait;
    use secrecy::SecretString;
    use serde_json::json;

    const WEBHOOK_SECRET: &str = "whsec_test";

    struct FailingRepository;

    #[async_trait]
    impl WebhookPaymentRepository for FailingRepository {
        async fn upsert(
            &self,
            _update: WebhookPaymentUpdate,
        ) -> Result<WebhookPaymentRecord, DomainError> {
            Err(DomainError::database("relation \"webhook_payments\" does not exist"))
        }

        async fn find_by_order_id(
            &self,
            _order_id: &OrderId,
        ) -> Result<Option<WebhookPaymentRecord>, DomainError> {
            Ok(None)
        }
    }

    fn handler(repo: Arc<dyn WebhookPaymentRepository>) -> HandleWebhookHandler {
        HandleWebhookHandler::new(
            WebhookSignatureVerifier::new(SecretString::new(WEBHOOK_SECRET.to_string())),
            repo,
        )
    }

    fn body(status: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "event": format!("payment.{}", status),
            "payload": {
                "payment": { "entity": {
                    "id": "pay_1",
                    "amount": 50000,
                    "currency": "INR",
                    "status": status,
                    "method": "upi",
                    "order_id": "order_1"
                }},
                "order": { "entity": { "id": "order_1" } }
            }
        }))
        .unwrap()
    }

    fn signed(raw_body: Vec<u8>, origin: Option<&str>) -> HandleWebhookCommand {
        HandleWebhookCommand {
            signature: Some(compute_signature_hex(WEBHOOK_SECRET.as_bytes(), &raw_body)),
            origin: origin.map(str::to_string),
            raw_body,
        }
    }

    async fn stored(repo: &InMemoryWebhookPaymentRepository) -> Option<WebhookPaymentRecord> {
        repo.find_by_order_id(&OrderId::new("order_1").unwrap())
            .await
            .unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Authentication Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_signature_is_rejected_without_write() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());
        let mut cmd = signed(body("captured"), None);
        cmd.signature = None;

        let result = handler(repo.clone()).handle(cmd).await;

        assert!(matches!(result, Err(WebhookError::MissingSignature)));
        assert!(stored(&repo).await.is_none());
    }

    #[tokio::test]
    async fn empty_signature_is_treated_as_missing() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());
        let mut cmd = signed(body("captured"), None);
        cmd.signature = Some(String::new());

        let result = handler(repo.clone()).handle(cmd).await;

        assert!(matches!(result, Err(WebhookError::MissingSignature)));
    }

    #[tokio::test]
    async fn wrong_signature_is_rejected_without_write() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());
        let mut cmd = signed(body("captured"), None);
        cmd.signature = Some(compute_signature_hex(b"other_secret", &cmd.raw_body));

        let result = handler(repo.clone()).handle(cmd).await;

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
        assert!(stored(&repo).await.is_none());
    }

    #[tokio::test]
    async fn signature_over_reformatted_body_is_rejected() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());
        let compact = body("captured");
        let value: serde_json::Value = serde_json::from_slice(&compact).unwrap();
        let pretty = serde_json::to_vec_pretty(&value).unwrap();

        let mut cmd = signed(compact, None);
        cmd.raw_body = pretty;

        let result = handler(repo.clone()).handle(cmd).await;

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[tokio::test]
    async fn signature_is_checked_against_exact_bytes_received() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());
        let raw = br#"{ "payload" : { "order": {"entity":{"id":"order_1"}}, "payment": {"entity":{"status":"authorized","id":"pay_1"}} } }"#.to_vec();

        let result = handler(repo.clone()).handle(signed(raw, None)).await;

        assert!(matches!(result, Ok(WebhookReply::Acknowledged { .. })));
    }

    // ══════════════════════════════════════════════════════════════
    // Payload Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn signed_but_malformed_payload_is_rejected_without_write() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());
        let raw = serde_json::to_vec(&json!({ "payload": { "order": { "id": "order_1" } } })).unwrap();

        let result = handler(repo.clone()).handle(signed(raw, None)).await;

        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
        assert!(stored(&repo).await.is_none());
    }

    // ══════════════════════════════════════════════════════════════
    // Dispatch Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn captured_redirects_to_success_page_with_origin() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());

        let reply = handler(repo.clone())
            .handle(signed(body("captured"), Some("https://shop.example.com")))
            .await
            .unwrap();

        assert_eq!(
            reply,
            WebhookReply::Redirect {
                location: "https://shop.example.com/payment-success?order_id=order_1".to_string()
            }
        );
        let record = stored(&repo).await.unwrap();
        assert_eq!(record.status, PaymentStatus::Captured);
        assert_eq!(record.method.as_deref(), Some("upi"));
    }

    #[tokio::test]
    async fn failed_redirects_to_failure_page() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());

        let reply = handler(repo.clone())
            .handle(signed(body("failed"), Some("https://shop.example.com")))
            .await
            .unwrap();

        assert_eq!(
            reply,
            WebhookReply::Redirect {
                location: "https://shop.example.com/payment-failed?order_id=order_1".to_string()
            }
        );
        assert_eq!(stored(&repo).await.unwrap().status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn missing_origin_falls_back_to_root() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());

        let reply = handler(repo).handle(signed(body("captured"), None)).await.unwrap();

        assert_eq!(
            reply,
            WebhookReply::Redirect {
                location: "/payment-success?order_id=order_1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn origin_outside_allow_list_falls_back_to_root() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());
        let handler = handler(repo)
            .with_allowed_origins(vec!["https://shop.example.com".to_string()]);

        let reply = handler
            .handle(signed(body("captured"), Some("https://evil.example.net")))
            .await
            .unwrap();

        assert_eq!(
            reply,
            WebhookReply::Redirect {
                location: "/payment-success?order_id=order_1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn origin_on_allow_list_is_used() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());
        let handler = handler(repo)
            .with_allowed_origins(vec!["https://shop.example.com/".to_string()]);

        let reply = handler
            .handle(signed(body("failed"), Some("https://shop.example.com")))
            .await
            .unwrap();

        assert_eq!(
            reply,
            WebhookReply::Redirect {
                location: "https://shop.example.com/payment-failed?order_id=order_1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn other_status_is_acknowledged_and_recorded() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());

        let reply = handler(repo.clone())
            .handle(signed(body("refunded"), Some("https://shop.example.com")))
            .await
            .unwrap();

        assert!(matches!(reply, WebhookReply::Acknowledged { .. }));
        assert_eq!(stored(&repo).await.unwrap().status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn duplicate_delivery_keeps_one_record() {
        let repo = Arc::new(InMemoryWebhookPaymentRepository::new());
        let handler = handler(repo.clone());

        handler.handle(signed(body("authorized"), None)).await.unwrap();
        handler.handle(signed(body("captured"), None)).await.unwrap();
        handler.handle(signed(body("captured"), None)).await.unwrap();

        assert_eq!(repo.len().await, 1);
        assert_eq!(stored(&repo).await.unwrap().status, PaymentStatus::Captured);
    }

    // ══════════════════════════════════════════════════════════════
    // Failure Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn persistence_failure_is_internal_error() {
        let result = handler(Arc::new(FailingRepository))
            .handle(signed(body("captured"), None))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, WebhookError::Persistence(_)));
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn normalize_origin_rejects_non_http_values() {
        assert_eq!(normalize_origin("null"), None);
        assert_eq!(normalize_origin("javascript:alert(1)"), None);
        assert_eq!(
            normalize_origin("https://shop.example.com/"),
            Some("https://shop.example.com".to_string())
        );
        assert_eq!(
            normalize_origin("http://localhost:3000"),
            Some("http://localhost:3000".to_string())
        );
    }
}
