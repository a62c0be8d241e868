//! PostgreSQL implementation of PendingPaymentStore.
//!
//! The conditional transition is a single `UPDATE ... WHERE status = ANY(...)
//! RETURNING`, so the status check and the write happen atomically inside
//! the database. A follow-up `SELECT` only distinguishes a missing record
//! from a lost race; it never decides whether to write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{PaymentId, Timestamp};
use crate::domain::payment::{PaymentError, PaymentStatus, PendingPayment, StatusChange};
use crate::ports::PendingPaymentStore;

const SELECT_COLUMNS: &str = r#"
    id, client_email, client_name, base_amount, bonus_amount, total_amount,
    description, status, invoice_number, provider_session_id, due_date,
    created_at, updated_at, notes
"#;

/// PostgreSQL implementation of the PendingPaymentStore port.
pub struct PostgresPendingPaymentStore {
    pool: PgPool,
}

impl PostgresPendingPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a pending payment.
#[derive(Debug, sqlx::FromRow)]
struct PendingPaymentRow {
    id: Uuid,
    client_email: String,
    client_name: String,
    base_amount: Decimal,
    bonus_amount: Decimal,
    total_amount: Decimal,
    description: String,
    status: String,
    invoice_number: String,
    provider_session_id: Option<String>,
    due_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    notes: Option<String>,
}

impl TryFrom<PendingPaymentRow> for PendingPayment {
    type Error = PaymentError;

    fn try_from(row: PendingPaymentRow) -> Result<Self, Self::Error> {
        Ok(PendingPayment {
            id: PaymentId::from_uuid(row.id),
            client_email: row.client_email,
            client_name: row.client_name,
            base_amount: row.base_amount,
            bonus_amount: row.bonus_amount,
            total_amount: row.total_amount,
            description: row.description,
            status: parse_status(&row.status)?,
            invoice_number: row.invoice_number,
            provider_session_id: row.provider_session_id,
            due_date: Timestamp::from_datetime(row.due_date),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            notes: row.notes,
        })
    }
}

pub(crate) fn parse_status(s: &str) -> Result<PaymentStatus, PaymentError> {
    s.parse::<PaymentStatus>()
        .map_err(|_| PaymentError::infrastructure(format!("Invalid status value: {}", s)))
}

fn status_names(statuses: &[PaymentStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

fn db_error(action: &str, e: sqlx::Error) -> PaymentError {
    PaymentError::infrastructure(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl PendingPaymentStore for PostgresPendingPaymentStore {
    async fn create(&self, payment: &PendingPayment) -> Result<(), PaymentError> {
        sqlx::query(
            r#"
            INSERT INTO pending_payments (
                id, client_email, client_name, base_amount, bonus_amount, total_amount,
                description, status, invoice_number, provider_session_id, due_date,
                created_at, updated_at, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(&payment.client_email)
        .bind(&payment.client_name)
        .bind(payment.base_amount)
        .bind(payment.bonus_amount)
        .bind(payment.total_amount)
        .bind(&payment.description)
        .bind(payment.status.as_str())
        .bind(&payment.invoice_number)
        .bind(&payment.provider_session_id)
        .bind(payment.due_date.as_datetime())
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .bind(&payment.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return PaymentError::validation("id", "payment already exists");
                }
            }
            db_error("create pending payment", e)
        })?;

        Ok(())
    }

    async fn get_by_id(&self, id: &PaymentId) -> Result<PendingPayment, PaymentError> {
        let row: Option<PendingPaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM pending_payments WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("load pending payment", e))?;

        row.ok_or(PaymentError::NotFound(*id))?.try_into()
    }

    async fn conditional_transition(
        &self,
        id: &PaymentId,
        expected: &[PaymentStatus],
        change: &StatusChange,
    ) -> Result<PendingPayment, PaymentError> {
        let row: Option<PendingPaymentRow> = sqlx::query_as(&format!(
            r#"
            UPDATE pending_payments SET
                status = $3,
                bonus_amount = COALESCE($4, bonus_amount),
                total_amount = COALESCE($5, total_amount),
                provider_session_id = COALESCE(provider_session_id, $6),
                updated_at = $7
            WHERE id = $1 AND status = ANY($2)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(status_names(expected))
        .bind(change.status.as_str())
        .bind(change.bonus_amount)
        .bind(change.total_amount)
        .bind(&change.provider_session_id)
        .bind(change.updated_at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("transition pending payment", e))?;

        if let Some(row) = row {
            return row.try_into();
        }

        let actual: Option<String> =
            sqlx::query_scalar("SELECT status FROM pending_payments WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("load pending payment status", e))?;

        match actual {
            Some(status) => Err(PaymentError::conflict(*id, parse_status(&status)?)),
            None => Err(PaymentError::NotFound(*id)),
        }
    }

    async fn list(&self, status: Option<PaymentStatus>) -> Result<Vec<PendingPayment>, PaymentError> {
        let rows: Vec<PendingPaymentRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM pending_payments
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
            SELECT_COLUMNS
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list pending payments", e))?;

        rows.into_iter().map(PendingPayment::try_from).collect()
    }
}
