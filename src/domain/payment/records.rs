//! Persisted payment records and their merge semantics.
//!
//! Both records are keyed by the gateway order id and written with upsert
//! semantics: the first write creates the record, later writes for the same
//! order id overwrite the mutable fields and keep `created_at`. Webhook fields
//! a delivery omits keep their stored value. There is no deletion path.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, PaymentId, Timestamp};

use super::amount::MinorUnits;
use super::status::PaymentStatus;

/// Outcome of the most recent checkout signature check for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub order_id: OrderId,
    pub payment_id: Option<PaymentId>,
    pub verified: bool,
    pub verification_timestamp: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields written by one verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentVerificationUpdate {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub verified: bool,
}

impl PaymentRecord {
    /// Applies a verification attempt on top of the existing record, if any.
    ///
    /// `now` is the store's clock; it becomes the verification and update time.
    pub fn merge(
        existing: Option<PaymentRecord>,
        update: PaymentVerificationUpdate,
        now: Timestamp,
    ) -> PaymentRecord {
        let created_at = existing.map(|r| r.created_at).unwrap_or(now);
        PaymentRecord {
            order_id: update.order_id,
            payment_id: Some(update.payment_id),
            verified: update.verified,
            verification_timestamp: now,
            created_at,
            updated_at: now,
        }
    }
}

/// Payment state as last reported by a gateway webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPaymentRecord {
    pub order_id: OrderId,
    pub payment_id: Option<PaymentId>,
    pub amount: Option<MinorUnits>,
    pub currency: Option<String>,
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields extracted from one webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookPaymentUpdate {
    pub order_id: OrderId,
    pub payment_id: Option<PaymentId>,
    pub amount: Option<MinorUnits>,
    pub currency: Option<String>,
    pub status: PaymentStatus,
    pub method: Option<String>,
}

impl WebhookPaymentRecord {
    /// Applies a webhook delivery on top of the existing record, if any.
    ///
    /// Status always takes the delivered value; optional fields fall back to
    /// the stored ones when the delivery leaves them out.
    pub fn merge(
        existing: Option<WebhookPaymentRecord>,
        update: WebhookPaymentUpdate,
        now: Timestamp,
    ) -> WebhookPaymentRecord {
        match existing {
            Some(existing) => WebhookPaymentRecord {
                order_id: update.order_id,
                payment_id: update.payment_id.or(existing.payment_id),
                amount: update.amount.or(existing.amount),
                currency: update.currency.or(existing.currency),
                status: update.status,
                method: update.method.or(existing.method),
                created_at: existing.created_at,
                updated_at: now,
            },
            None => WebhookPaymentRecord {
                order_id: update.order_id,
                payment_id: update.payment_id,
                amount: update.amount,
                currency: update.currency,
                status: update.status,
                method: update.method,
                created_at: now,
                updated_at: now,
            },
        }
    }
}
