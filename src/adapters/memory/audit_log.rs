//! In-memory audit log.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::foundation::PaymentId;
use crate::domain::payment::AuditEntry;
use crate::ports::{AuditLog, AuditStoreError};

#[derive(Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry in append order.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AuditEntry>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditStoreError> {
        self.lock().push(entry.clone());
        Ok(())
    }

    async fn list_for_entity(
        &self,
        entity_id: &PaymentId,
    ) -> Result<Vec<AuditEntry>, AuditStoreError> {
        Ok(self
            .lock()
            .iter()
            .filter(|e| &e.entity_id == entity_id)
            .cloned()
            .collect())
    }
}
