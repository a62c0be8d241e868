//! PendingPayment aggregate.
//!
//! One record per invoice/payment request. Created in `Pending`, mutated only
//! through a [`StatusChange`] applied by the store's conditional transition.
//!
//! # Invariants
//!
//! - `id`, `invoice_number` and `created_at` never change after creation
//! - `base_amount > 0`
//! - `total_amount == base_amount + bonus_amount`, hence `total_amount >= base_amount`
//! - `provider_session_id` is written at most once

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PaymentId, StateMachine, Timestamp, ValidationError};

use super::{PaymentError, PaymentStatus};

/// Input for creating a pending payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPendingPayment {
    pub client_email: String,
    pub client_name: String,
    pub base_amount: Decimal,
    pub description: String,
    pub notes: Option<String>,
}

impl NewPendingPayment {
    /// Checks required fields before anything is persisted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let email = self.client_email.trim();
        if email.is_empty() {
            return Err(ValidationError::empty_field("client_email"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => {
                return Err(ValidationError::invalid_format(
                    "client_email",
                    "expected an address like name@example.com",
                ))
            }
        }
        if self.client_name.trim().is_empty() {
            return Err(ValidationError::empty_field("client_name"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::empty_field("description"));
        }
        if self.base_amount <= Decimal::ZERO {
            return Err(ValidationError::not_positive("base_amount"));
        }
        Ok(())
    }
}

/// Amounts recorded when a payment completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionAmounts {
    pub bonus_amount: Decimal,
    pub total_amount: Decimal,
}

impl CompletionAmounts {
    /// Splits a charged amount into base and bonus.
    ///
    /// Anything above the base is bonus. An underpayment records no bonus and
    /// keeps the total at the base amount.
    pub fn from_charge(base_amount: Decimal, charged_amount: Decimal) -> Self {
        let bonus_amount = (charged_amount - base_amount).max(Decimal::ZERO);
        Self {
            bonus_amount,
            total_amount: base_amount + bonus_amount,
        }
    }
}

/// Fields written by a conditional status transition.
///
/// `None` leaves the stored value untouched. `provider_session_id` is only
/// written when the record does not already carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: PaymentStatus,
    pub bonus_amount: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub provider_session_id: Option<String>,
    pub updated_at: Timestamp,
}

impl StatusChange {
    /// A plain status move with no amount changes.
    pub fn status_only(status: PaymentStatus, updated_at: Timestamp) -> Self {
        Self {
            status,
            bonus_amount: None,
            total_amount: None,
            provider_session_id: None,
            updated_at,
        }
    }
}

/// Pending payment aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPayment {
    pub id: PaymentId,
    pub client_email: String,
    pub client_name: String,
    pub base_amount: Decimal,
    pub bonus_amount: Decimal,
    pub total_amount: Decimal,
    pub description: String,
    pub status: PaymentStatus,
    pub invoice_number: String,
    pub provider_session_id: Option<String>,
    pub due_date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub notes: Option<String>,
}

impl PendingPayment {
    /// Builds a new record in `Pending`.
    ///
    /// The due date is `payment_terms_days` after creation.
    pub fn create(
        id: PaymentId,
        input: NewPendingPayment,
        now: Timestamp,
        payment_terms_days: u32,
    ) -> Result<Self, ValidationError> {
        input.validate()?;

        Ok(Self {
            id,
            client_email: input.client_email.trim().to_string(),
            client_name: input.client_name.trim().to_string(),
            base_amount: input.base_amount,
            bonus_amount: Decimal::ZERO,
            total_amount: input.base_amount,
            description: input.description.trim().to_string(),
            status: PaymentStatus::Pending,
            invoice_number: Self::invoice_number_for(&id),
            provider_session_id: None,
            due_date: now.add_days(i64::from(payment_terms_days)),
            created_at: now,
            updated_at: now,
            notes: input.notes.filter(|n| !n.trim().is_empty()),
        })
    }

    /// Invoice number derived from the record id, e.g. `INV-1A2B3C4D`.
    pub fn invoice_number_for(id: &PaymentId) -> String {
        format!("INV-{}", id.short_code())
    }

    /// Change that records a provider-confirmed payment.
    ///
    /// Callers must already have ruled out an existing completion; this only
    /// checks that the record is still payable and the event is well formed.
    pub fn completion_change(
        &self,
        charged_amount: Decimal,
        session_id: &str,
        now: Timestamp,
    ) -> Result<StatusChange, PaymentError> {
        self.status.transition_to(PaymentStatus::Completed)?;

        if charged_amount < Decimal::ZERO {
            return Err(ValidationError::invalid_format("charged_amount", "must not be negative").into());
        }
        if session_id.trim().is_empty() {
            return Err(ValidationError::empty_field("session_id").into());
        }

        let amounts = CompletionAmounts::from_charge(self.base_amount, charged_amount);
        Ok(StatusChange {
            status: PaymentStatus::Completed,
            bonus_amount: Some(amounts.bonus_amount),
            total_amount: Some(amounts.total_amount),
            provider_session_id: Some(session_id.trim().to_string()),
            updated_at: now,
        })
    }

    /// Change requested by an admin.
    ///
    /// A manual completion knows no charged amount, so the total is pinned to
    /// the base plus whatever bonus is already recorded.
    pub fn manual_change(
        &self,
        target: PaymentStatus,
        now: Timestamp,
    ) -> Result<StatusChange, PaymentError> {
        let status = self.status.transition_to(target)?;

        if status == PaymentStatus::Completed {
            return Ok(StatusChange {
                status,
                bonus_amount: Some(self.bonus_amount),
                total_amount: Some(self.base_amount + self.bonus_amount),
                provider_session_id: None,
                updated_at: now,
            });
        }

        Ok(StatusChange::status_only(status, now))
    }

    /// Writes a change into this record.
    ///
    /// Storage adapters call this only after their status guard passed.
    pub fn apply(&mut self, change: &StatusChange) {
        self.status = change.status;
        if let Some(bonus) = change.bonus_amount {
            self.bonus_amount = bonus;
        }
        if let Some(total) = change.total_amount {
            self.total_amount = total;
        }
        if self.provider_session_id.is_none() {
            self.provider_session_id = change.provider_session_id.clone();
        }
        self.updated_at = change.updated_at;
    }
}
