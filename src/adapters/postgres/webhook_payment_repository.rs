//! PostgreSQL implementation of WebhookPaymentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, PaymentId, Timestamp};
use crate::domain::payment::{MinorUnits, PaymentStatus, WebhookPaymentRecord, WebhookPaymentUpdate};
use crate::ports::WebhookPaymentRepository;

/// PostgreSQL implementation of the WebhookPaymentRepository port.
pub struct PostgresWebhookPaymentRepository {
    pool: PgPool,
}

impl PostgresWebhookPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookPaymentRow {
    order_id: String,
    payment_id: Option<String>,
    amount: Option<i64>,
    currency: Option<String>,
    status: String,
    method: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WebhookPaymentRow> for WebhookPaymentRecord {
    type Error = DomainError;

    fn try_from(row: WebhookPaymentRow) -> Result<Self, Self::Error> {
        let amount = row
            .amount
            .map(|a| {
                u64::try_from(a).map(MinorUnits::new).map_err(|_| {
                    DomainError::new(ErrorCode::DatabaseError, format!("Invalid amount: {}", a))
                })
            })
            .transpose()?;

        Ok(WebhookPaymentRecord {
            order_id: OrderId::new(row.order_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid order_id: {}", e))
            })?,
            payment_id: row.payment_id.and_then(|id| PaymentId::new(id).ok()),
            amount,
            currency: row.currency,
            status: PaymentStatus::from(row.status),
            method: row.method,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn amount_to_i64(amount: Option<MinorUnits>) -> Result<Option<i64>, DomainError> {
    amount
        .map(|a| {
            i64::try_from(a.value()).map_err(|_| {
                DomainError::new(
                    ErrorCode::ValidationFailed,
                    format!("Amount {} does not fit in BIGINT", a),
                )
            })
        })
        .transpose()
}

#[async_trait]
impl WebhookPaymentRepository for PostgresWebhookPaymentRepository {
    async fn upsert(
        &self,
        update: WebhookPaymentUpdate,
    ) -> Result<WebhookPaymentRecord, DomainError> {
        let amount = amount_to_i64(update.amount)?;

        let row: WebhookPaymentRow = sqlx::query_as(
            r#"
            INSERT INTO webhook_payments (
                order_id, payment_id, amount, currency, status, method, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            ON CONFLICT (order_id) DO UPDATE SET
                payment_id = COALESCE(EXCLUDED.payment_id, webhook_payments.payment_id),
                amount = COALESCE(EXCLUDED.amount, webhook_payments.amount),
                currency = COALESCE(EXCLUDED.currency, webhook_payments.currency),
                status = EXCLUDED.status,
                method = COALESCE(EXCLUDED.method, webhook_payments.method),
                updated_at = EXCLUDED.updated_at
            RETURNING order_id, payment_id, amount, currency, status, method, created_at, updated_at
            "#,
        )
        .bind(update.order_id.as_str())
        .bind(update.payment_id.as_ref().map(|p| p.as_str()))
        .bind(amount)
        .bind(&update.currency)
        .bind(update.status.as_str())
        .bind(&update.method)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to upsert webhook payment: {}", e))
                .with_detail("order_id", update.order_id.as_str())
        })?;

        WebhookPaymentRecord::try_from(row)
    }

    async fn find_by_order_id(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<WebhookPaymentRecord>, DomainError> {
        let row: Option<WebhookPaymentRow> = sqlx::query_as(
            r#"
            SELECT order_id, payment_id, amount, currency, status, method, created_at, updated_at
            FROM webhook_payments
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find webhook payment: {}", e)))?;

        row.map(WebhookPaymentRecord::try_from).transpose()
    }
}
