//! Parsing of gateway webhook bodies.
//!
//! Expected shape:
//!
//! ```json
//! {
//!   "event": "payment.captured",
//!   "payload": {
//!     "payment": { "entity": { "id": "pay_..", "amount": 50000, "currency": "INR",
//!                              "status": "captured", "method": "upi", "order_id": "order_.." } },
//!     "order":   { "entity": { "id": "order_.." } }
//!   }
//! }
//! ```
//!
//! The `entity` wrapper is optional; a bare object is accepted as the entity.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::foundation::{OrderId, PaymentId};

use super::amount::MinorUnits;
use super::records::WebhookPaymentUpdate;
use super::status::PaymentStatus;
use super::webhook_errors::WebhookError;

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    payload: Option<WebhookBody>,
}

#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(default)]
    payment: Option<Value>,
    #[serde(default)]
    order: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PaymentEntity {
    id: Option<String>,
    amount: Option<u64>,
    currency: Option<String>,
    status: Option<String>,
    method: Option<String>,
    order_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderEntity {
    id: Option<String>,
}

/// A verified webhook body reduced to what gets persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedWebhook {
    /// Event name, e.g. `payment.captured`, when present.
    pub event: Option<String>,
    pub update: WebhookPaymentUpdate,
}

/// Parses a raw webhook body.
///
/// Must only be called after the signature over the same bytes was verified.
pub fn parse_webhook_payload(raw_body: &[u8]) -> Result<ParsedWebhook, WebhookError> {
    let envelope: WebhookEnvelope = serde_json::from_slice(raw_body)
        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

    let body = envelope
        .payload
        .ok_or_else(|| WebhookError::MalformedPayload("payload missing".to_string()))?;

    let payment: PaymentEntity = entity(body.payment, "payload.payment")?;
    let order: OrderEntity = entity(body.order, "payload.order")?;

    let order_id = order
        .id
        .or(payment.order_id)
        .ok_or_else(|| WebhookError::MalformedPayload("order id missing".to_string()))
        .and_then(|id| {
            OrderId::new(id).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
        })?;

    let status = payment
        .status
        .map(PaymentStatus::from)
        .ok_or_else(|| WebhookError::MalformedPayload("payment status missing".to_string()))?;

    let payment_id = payment.id.and_then(|id| PaymentId::new(id).ok());

    Ok(ParsedWebhook {
        event: envelope.event,
        update: WebhookPaymentUpdate {
            order_id,
            payment_id,
            amount: payment.amount.map(MinorUnits::new),
            currency: payment.currency,
            status,
            method: payment.method,
        },
    })
}

/// Unwraps `{ "entity": {...} }` if present and deserializes the entity.
fn entity<T: serde::de::DeserializeOwned>(
    value: Option<Value>,
    path: &str,
) -> Result<T, WebhookError> {
    let value = match value {
        Some(Value::Object(mut map)) => match map.remove("entity") {
            Some(inner @ Value::Object(_)) => inner,
            Some(_) => {
                return Err(WebhookError::MalformedPayload(format!(
                    "{}.entity is not an object",
                    path
                )))
            }
            None => Value::Object(map),
        },
        Some(_) => {
            return Err(WebhookError::MalformedPayload(format!(
                "{} is not an object",
                path
            )))
        }
        None => return Err(WebhookError::MalformedPayload(format!("{} missing", path))),
    };

    serde_json::from_value(value)
        .map_err(|e| WebhookError::MalformedPayload(format!("{}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<ParsedWebhook, WebhookError> {
        parse_webhook_payload(&serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn parses_entity_wrapped_payload() {
        let parsed = parse(json!({
            "event": "payment.captured",
            "payload": {
                "payment": { "entity": {
                    "id": "pay_29QQoUBi66xm2f",
                    "amount": 50000,
                    "currency": "INR",
                    "status": "captured",
                    "method": "card",
                    "order_id": "order_9A33XWu170gUtm"
                }},
                "order": { "entity": { "id": "order_9A33XWu170gUtm" } }
            }
        }))
        .unwrap();

        assert_eq!(parsed.event.as_deref(), Some("payment.captured"));
        assert_eq!(parsed.update.order_id.as_str(), "order_9A33XWu170gUtm");
        assert_eq!(parsed.update.payment_id.unwrap().as_str(), "pay_29QQoUBi66xm2f");
        assert_eq!(parsed.update.amount, Some(MinorUnits::new(50_000)));
        assert_eq!(parsed.update.status, PaymentStatus::Captured);
        assert_eq!(parsed.update.method.as_deref(), Some("card"));
    }

    #[test]
    fn parses_bare_entities() {
        let parsed = parse(json!({
            "payload": {
                "payment": { "id": "pay_1", "status": "failed" },
                "order": { "id": "order_1" }
            }
        }))
        .unwrap();

        assert_eq!(parsed.update.order_id.as_str(), "order_1");
        assert_eq!(parsed.update.status, PaymentStatus::Failed);
        assert!(parsed.update.amount.is_none());
    }

    #[test]
    fn falls_back_to_payment_order_id() {
        let parsed = parse(json!({
            "payload": {
                "payment": { "id": "pay_1", "status": "captured", "order_id": "order_7" },
                "order": {}
            }
        }))
        .unwrap();

        assert_eq!(parsed.update.order_id.as_str(), "order_7");
    }

    #[test]
    fn missing_payment_is_malformed() {
        let result = parse(json!({ "payload": { "order": { "id": "order_1" } } }));
        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }

    #[test]
    fn missing_order_is_malformed() {
        let result = parse(json!({
            "payload": { "payment": { "id": "pay_1", "status": "captured" } }
        }));
        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }

    #[test]
    fn missing_payload_is_malformed() {
        let result = parse(json!({ "event": "payment.captured" }));
        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }

    #[test]
    fn non_object_entity_is_malformed() {
        let result = parse(json!({
            "payload": { "payment": "pay_1", "order": { "id": "order_1" } }
        }));
        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }

    #[test]
    fn missing_status_is_malformed() {
        let result = parse(json!({
            "payload": { "payment": { "id": "pay_1" }, "order": { "id": "order_1" } }
        }));
        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let result = parse_webhook_payload(b"payment=captured");
        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }

    #[test]
    fn fractional_amount_is_malformed() {
        let result = parse(json!({
            "payload": {
                "payment": { "id": "pay_1", "status": "captured", "amount": 10.5 },
                "order": { "id": "order_1" }
            }
        }));
        assert!(matches!(result, Err(WebhookError::MalformedPayload(_))));
    }
}
