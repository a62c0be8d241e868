//! Audit log port - append-only store of status transitions.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::PaymentId;
use crate::domain::payment::AuditEntry;

/// Append-only audit store.
///
/// Entries are never updated or deleted.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one entry.
    ///
    /// # Errors
    ///
    /// `Transient` when retrying may help (connection loss, timeouts),
    /// `Permanent` otherwise.
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditStoreError>;

    /// All entries for a record, oldest first.
    async fn list_for_entity(&self, entity_id: &PaymentId)
        -> Result<Vec<AuditEntry>, AuditStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditStoreError {
    #[error("Transient audit store failure: {0}")]
    Transient(String),

    #[error("Audit store failure: {0}")]
    Permanent(String),
}

impl AuditStoreError {
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient(reason.into())
    }

    pub fn permanent(reason: impl Into<String>) -> Self {
        Self::Permanent(reason.into())
    }

    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
