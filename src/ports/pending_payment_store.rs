//! Pending payment store port.
//!
//! Defines the contract for persisting pending payments and moving them
//! between statuses.
//!
//! # Design
//!
//! - **Conditional transitions only**: after creation, `status`,
//!   `provider_session_id` and the amounts change only through
//!   [`PendingPaymentStore::conditional_transition`]
//! - **Atomic status guard**: the status check and the write are one
//!   operation, so two racing writers never both succeed
//! - **No deletes**: records are never physically removed
//!
//! # Example
//!
//! ```ignore
//! let current = store.get_by_id(&id).await?;
//! let change = current.manual_change(PaymentStatus::Cancelled, Timestamp::now())?;
//! let updated = store
//!     .conditional_transition(&id, &[current.status], &change)
//!     .await?;
//! ```

use async_trait::async_trait;

use crate::domain::foundation::PaymentId;
use crate::domain::payment::{PaymentError, PaymentStatus, PendingPayment, StatusChange};

/// Repository port for PendingPayment persistence.
#[async_trait]
pub trait PendingPaymentStore: Send + Sync {
    /// Insert a freshly created record.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if a record with the same id exists
    /// - `Infrastructure` on persistence failure
    async fn create(&self, payment: &PendingPayment) -> Result<(), PaymentError>;

    /// Load a record by id.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record has this id
    /// - `Infrastructure` on persistence failure
    async fn get_by_id(&self, id: &PaymentId) -> Result<PendingPayment, PaymentError>;

    /// Apply `change` only if the stored status is one of `expected`.
    ///
    /// Returns the record as written. `provider_session_id` in the change is
    /// only stored when the record has none yet.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record has this id
    /// - `Conflict` carrying the actual status when it is not in `expected`;
    ///   nothing is written in that case
    /// - `Infrastructure` on persistence failure
    async fn conditional_transition(
        &self,
        id: &PaymentId,
        expected: &[PaymentStatus],
        change: &StatusChange,
    ) -> Result<PendingPayment, PaymentError>;

    /// List records, newest first, optionally filtered by status.
    async fn list(&self, status: Option<PaymentStatus>) -> Result<Vec<PendingPayment>, PaymentError>;
}
