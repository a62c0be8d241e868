//! Payment status state machine.
//!
//! A pending payment starts in `Pending` and may end `Completed` or
//! `Cancelled`. `Overdue` is a waiting state that still accepts payment.
//! Nothing ever moves back into `Pending`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of a pending payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Invoice issued, awaiting payment.
    Pending,

    /// Paid, either via the provider or confirmed by an admin. Terminal.
    Completed,

    /// Withdrawn by an admin. Terminal.
    Cancelled,

    /// Past due; can still be paid or cancelled.
    Overdue,
}

impl PaymentStatus {
    /// Statuses from which a completion may still be accepted.
    pub const PAYABLE: [PaymentStatus; 2] = [PaymentStatus::Pending, PaymentStatus::Overdue];

    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Completed,
        PaymentStatus::Cancelled,
        PaymentStatus::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Overdue => "overdue",
        }
    }

    /// True while the client can still pay this record.
    pub fn is_payable(&self) -> bool {
        Self::PAYABLE.contains(self)
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            (Pending, Completed)
                | (Pending, Cancelled)
                | (Pending, Overdue)
                | (Overdue, Completed)
                | (Overdue, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Completed, Cancelled, Overdue],
            Overdue => vec![Completed, Cancelled],
            Completed | Cancelled => vec![],
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            "overdue" => Ok(PaymentStatus::Overdue),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown payment status '{}'", other),
            )),
        }
    }
}
