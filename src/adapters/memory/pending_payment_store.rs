//! In-memory pending payment store.
//!
//! The conditional transition holds the write lock across the status check
//! and the update, which makes it atomic for every caller in the process.
//! Used by tests and for running the service without a database.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::foundation::PaymentId;
use crate::domain::payment::{PaymentError, PaymentStatus, PendingPayment, StatusChange};
use crate::ports::PendingPaymentStore;

#[derive(Default)]
pub struct InMemoryPendingPaymentStore {
    records: RwLock<HashMap<PaymentId, PendingPayment>>,
}

impl InMemoryPendingPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock cannot leave a half-written record, so
    // poisoned guards are recovered.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<PaymentId, PendingPayment>> {
        self.records.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PaymentId, PendingPayment>> {
        self.records.write().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl PendingPaymentStore for InMemoryPendingPaymentStore {
    async fn create(&self, payment: &PendingPayment) -> Result<(), PaymentError> {
        let mut records = self.write();
        if records.contains_key(&payment.id) {
            return Err(PaymentError::validation("id", "payment already exists"));
        }
        records.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &PaymentId) -> Result<PendingPayment, PaymentError> {
        self.read()
            .get(id)
            .cloned()
            .ok_or(PaymentError::NotFound(*id))
    }

    async fn conditional_transition(
        &self,
        id: &PaymentId,
        expected: &[PaymentStatus],
        change: &StatusChange,
    ) -> Result<PendingPayment, PaymentError> {
        let mut records = self.write();
        let record = records.get_mut(id).ok_or(PaymentError::NotFound(*id))?;

        if !expected.contains(&record.status) {
            return Err(PaymentError::conflict(*id, record.status));
        }

        record.apply(change);
        Ok(record.clone())
    }

    async fn list(&self, status: Option<PaymentStatus>) -> Result<Vec<PendingPayment>, PaymentError> {
        let mut payments: Vec<PendingPayment> = self
            .read()
            .values()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }
}
