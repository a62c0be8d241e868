//! PostgreSQL implementation of AuditLog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{AuditEntryId, PaymentId, Timestamp};
use crate::domain::payment::{Actor, AuditEntry};
use crate::ports::{AuditLog, AuditStoreError};

use super::pending_payment_store::parse_status;

pub struct PostgresAuditLog {
    pool: PgPool,
}

impl PostgresAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    entity_id: Uuid,
    previous_status: String,
    new_status: String,
    amount: Decimal,
    bonus_amount: Decimal,
    actor: String,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = AuditStoreError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let status = |s: &str| parse_status(s).map_err(|e| AuditStoreError::permanent(e.to_string()));
        Ok(AuditEntry {
            id: AuditEntryId::from_uuid(row.id),
            entity_id: PaymentId::from_uuid(row.entity_id),
            previous_status: status(&row.previous_status)?,
            new_status: status(&row.new_status)?,
            amount: row.amount,
            bonus_amount: row.bonus_amount,
            actor: Actor::from_storage_string(&row.actor),
            timestamp: Timestamp::from_datetime(row.recorded_at),
        })
    }
}

/// Sorts sqlx failures into ones worth retrying and ones that are not.
fn classify(e: sqlx::Error) -> AuditStoreError {
    let transient = match &e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Protocol(_) => true,
        sqlx::Error::Database(db_err) => db_err.code().map_or(false, |code| {
            // Connection exceptions, serialization failures, deadlocks, admin shutdown.
            code.starts_with("08") || code == "40001" || code == "40P01" || code == "57P01"
        }),
        _ => false,
    };

    if transient {
        AuditStoreError::transient(e.to_string())
    } else {
        AuditStoreError::permanent(e.to_string())
    }
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditStoreError> {
        sqlx::query(
            r#"
            INSERT INTO payment_audit_log (
                id, entity_id, previous_status, new_status, amount, bonus_amount, actor, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.entity_id.as_uuid())
        .bind(entry.previous_status.as_str())
        .bind(entry.new_status.as_str())
        .bind(entry.amount)
        .bind(entry.bonus_amount)
        .bind(entry.actor.as_storage_string())
        .bind(entry.timestamp.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        Ok(())
    }

    async fn list_for_entity(
        &self,
        entity_id: &PaymentId,
    ) -> Result<Vec<AuditEntry>, AuditStoreError> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            r#"
            SELECT id, entity_id, previous_status, new_status, amount, bonus_amount, actor, recorded_at
            FROM payment_audit_log
            WHERE entity_id = $1
            ORDER BY recorded_at ASC, id ASC
            "#,
        )
        .bind(entity_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        rows.into_iter().map(AuditEntry::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn pool_timeouts_are_transient() {
        assert!(classify(sqlx::Error::PoolTimedOut).is_transient());
        assert!(classify(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset"
        )))
        .is_transient());
    }

    #[test]
    fn missing_rows_and_decode_errors_are_permanent() {
        assert!(!classify(sqlx::Error::RowNotFound).is_transient());
        assert!(!classify(sqlx::Error::ColumnNotFound("actor".into())).is_transient());
    }

    #[test]
    fn row_converts_to_entry() {
        let row = AuditRow {
            id: Uuid::new_v4(),
            entity_id: Uuid::new_v4(),
            previous_status: "pending".to_string(),
            new_status: "completed".to_string(),
            amount: dec!(125),
            bonus_amount: dec!(25),
            actor: "admin:coach".to_string(),
            recorded_at: Utc::now(),
        };

        let entry = AuditEntry::try_from(row).unwrap();

        assert_eq!(entry.previous_status, PaymentStatus::Pending);
        assert_eq!(entry.new_status, PaymentStatus::Completed);
        assert_eq!(entry.actor, Actor::admin("coach"));
    }
}
