//! PostgreSQL implementation of PaymentRecordRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, PaymentId, Timestamp};
use crate::domain::payment::{PaymentRecord, PaymentVerificationUpdate};
use crate::ports::PaymentRecordRepository;

/// PostgreSQL implementation of the PaymentRecordRepository port.
///
/// Upserts use `ON CONFLICT (order_id)` so concurrent verifications for the
/// same order serialize on the row; timestamps come from the database clock.
pub struct PostgresPaymentRecordRepository {
    pool: PgPool,
}

impl PostgresPaymentRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment record.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRecordRow {
    order_id: String,
    payment_id: Option<String>,
    verified: bool,
    verification_timestamp: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRecordRow> for PaymentRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRecordRow) -> Result<Self, Self::Error> {
        Ok(PaymentRecord {
            order_id: OrderId::new(row.order_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid order_id: {}", e))
            })?,
            payment_id: row.payment_id.and_then(|id| PaymentId::new(id).ok()),
            verified: row.verified,
            verification_timestamp: Timestamp::from_datetime(row.verification_timestamp),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl PaymentRecordRepository for PostgresPaymentRecordRepository {
    async fn upsert_verification(
        &self,
        update: PaymentVerificationUpdate,
    ) -> Result<PaymentRecord, DomainError> {
        let row: PaymentRecordRow = sqlx::query_as(
            r#"
            INSERT INTO payment_records (
                order_id, payment_id, verified, verification_timestamp, created_at, updated_at
            ) VALUES ($1, $2, $3, NOW(), NOW(), NOW())
            ON CONFLICT (order_id) DO UPDATE SET
                payment_id = EXCLUDED.payment_id,
                verified = EXCLUDED.verified,
                verification_timestamp = EXCLUDED.verification_timestamp,
                updated_at = EXCLUDED.updated_at
            RETURNING order_id, payment_id, verified, verification_timestamp, created_at, updated_at
            "#,
        )
        .bind(update.order_id.as_str())
        .bind(update.payment_id.as_str())
        .bind(update.verified)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to upsert payment record: {}", e))
                .with_detail("order_id", update.order_id.as_str())
        })?;

        PaymentRecord::try_from(row)
    }

    async fn find_by_order_id(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRecordRow> = sqlx::query_as(
            r#"
            SELECT order_id, payment_id, verified, verification_timestamp, created_at, updated_at
            FROM payment_records
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find payment record: {}", e)))?;

        row.map(PaymentRecord::try_from).transpose()
    }
}
