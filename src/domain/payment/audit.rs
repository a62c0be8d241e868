//! Audit trail entries for payment status transitions.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuditEntryId, PaymentId, Timestamp};

use super::{PaymentStatus, PendingPayment};

/// Who caused a transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Actor {
    /// Automated path, e.g. a payment provider callback.
    System,
    /// A named back-office user.
    Admin(String),
}

impl Actor {
    pub fn admin(id: impl Into<String>) -> Self {
        Actor::Admin(id.into())
    }

    /// Flat form stored in the audit log: `system` or `admin:<id>`.
    pub fn as_storage_string(&self) -> String {
        match self {
            Actor::System => "system".to_string(),
            Actor::Admin(id) => format!("admin:{}", id),
        }
    }

    /// Inverse of [`Actor::as_storage_string`]. Unknown prefixes read as system.
    pub fn from_storage_string(s: &str) -> Self {
        match s.strip_prefix("admin:") {
            Some(id) => Actor::Admin(id.to_string()),
            None => Actor::System,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_storage_string())
    }
}

/// Immutable record of one status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub entity_id: PaymentId,
    pub previous_status: PaymentStatus,
    pub new_status: PaymentStatus,
    /// Total amount after the transition.
    pub amount: Decimal,
    pub bonus_amount: Decimal,
    pub actor: Actor,
    pub timestamp: Timestamp,
}

impl AuditEntry {
    /// Entry describing `previous_status -> payment.status` for a freshly written record.
    pub fn for_transition(
        previous_status: PaymentStatus,
        payment: &PendingPayment,
        actor: Actor,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            entity_id: payment.id,
            previous_status,
            new_status: payment.status,
            amount: payment.total_amount,
            bonus_amount: payment.bonus_amount,
            actor,
            timestamp: payment.updated_at,
        }
    }
}
