//! Payment event verifier port.
//!
//! Authenticates a raw provider callback and reduces it to the one event this
//! subsystem acts on: a completed payment for a pending-payment record.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::foundation::PaymentId;

/// A provider-confirmed payment for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEvent {
    /// Provider event id, for log correlation.
    pub event_id: String,
    pub record_id: PaymentId,
    /// Amount actually charged, in major currency units.
    pub charged_amount: Decimal,
    pub session_id: String,
}

/// Result of verifying a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    Completion(CompletionEvent),
    /// Authentic but not something this subsystem handles. Carries the
    /// provider's event type.
    Unrelated(String),
}

/// Port for authenticating payment provider callbacks.
#[async_trait]
pub trait PaymentEventVerifier: Send + Sync {
    /// Verify `signature` over the raw `payload` and parse the event.
    async fn verify(&self, payload: &[u8], signature: &str) -> Result<ProviderEvent, WebhookError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    #[error("Missing or malformed signature header")]
    MissingSignature,

    #[error("Webhook signature does not match")]
    InvalidSignature,

    #[error("Webhook timestamp outside tolerance ({age_secs}s old)")]
    StaleTimestamp { age_secs: i64 },

    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("Webhook event lacks required field: {0}")]
    MissingField(String),

    #[error("Test-mode event rejected in live mode")]
    LivemodeMismatch,
}

impl WebhookError {
    /// True when the sender could not be authenticated.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::InvalidSignature
                | WebhookError::StaleTimestamp { .. }
        )
    }
}
