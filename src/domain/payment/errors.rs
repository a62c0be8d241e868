//! Payment-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | InvalidTransition | 409 |
//! | Conflict | 409 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |
//!
//! Side-effect failures (rendering, email, audit) are deliberately not part
//! of this enum: they never reach a caller.

use thiserror::Error;

use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, TransitionRejected, ValidationError,
};

use super::PaymentStatus;

/// Errors surfaced by pending-payment operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// No record with this id.
    #[error("Pending payment not found: {0}")]
    NotFound(PaymentId),

    /// The state table does not allow this move. Nothing was written.
    #[error("Cannot move payment from {from} to {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// Another writer changed the status between read and write.
    #[error("Payment {id} was concurrently moved to {actual}")]
    Conflict { id: PaymentId, actual: PaymentStatus },

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl PaymentError {
    pub fn not_found(id: PaymentId) -> Self {
        PaymentError::NotFound(id)
    }

    pub fn invalid_transition(from: PaymentStatus, to: PaymentStatus) -> Self {
        PaymentError::InvalidTransition { from, to }
    }

    pub fn conflict(id: PaymentId, actual: PaymentStatus) -> Self {
        PaymentError::Conflict { id, actual }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        PaymentError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::NotFound(_) => ErrorCode::PaymentNotFound,
            PaymentError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            PaymentError::Conflict { .. } => ErrorCode::ConcurrentModification,
            PaymentError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            PaymentError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<ValidationError> for PaymentError {
    fn from(err: ValidationError) -> Self {
        PaymentError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<TransitionRejected<PaymentStatus>> for PaymentError {
    fn from(rejected: TransitionRejected<PaymentStatus>) -> Self {
        PaymentError::InvalidTransition {
            from: rejected.from,
            to: rejected.to,
        }
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        PaymentError::Infrastructure(err.to_string())
    }
}
