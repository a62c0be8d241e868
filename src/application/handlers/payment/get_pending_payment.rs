//! GetPendingPaymentHandler - admin view of one record and its history.

use std::sync::Arc;

use crate::domain::foundation::PaymentId;
use crate::domain::payment::{AuditEntry, PaymentError, PendingPayment};
use crate::ports::{AuditLog, PendingPaymentStore};

/// A record together with its audit trail, oldest entry first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPaymentDetails {
    pub payment: PendingPayment,
    pub audit_trail: Vec<AuditEntry>,
}

pub struct GetPendingPaymentHandler {
    store: Arc<dyn PendingPaymentStore>,
    audit_log: Arc<dyn AuditLog>,
}

impl GetPendingPaymentHandler {
    pub fn new(store: Arc<dyn PendingPaymentStore>, audit_log: Arc<dyn AuditLog>) -> Self {
        Self { store, audit_log }
    }

    pub async fn handle(&self, id: PaymentId) -> Result<PendingPaymentDetails, PaymentError> {
        let payment = self.store.get_by_id(&id).await?;
        let audit_trail = self
            .audit_log
            .list_for_entity(&id)
            .await
            .map_err(|e| PaymentError::infrastructure(e.to_string()))?;

        Ok(PendingPaymentDetails {
            payment,
            audit_trail,
        })
    }
}
