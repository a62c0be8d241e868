//! Stripe implementation of PaymentEventVerifier.
//!
//! Verifies the `Stripe-Signature` header and maps paid checkout sessions to
//! completion events.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::PaymentId;
use crate::ports::{CompletionEvent, PaymentEventVerifier, ProviderEvent, WebhookError};

use super::webhook_types::{
    hex_encode, SignatureHeader, StripeCheckoutSession, StripeWebhookEvent,
    CHECKOUT_ASYNC_PAYMENT_SUCCEEDED, CHECKOUT_SESSION_COMPLETED, PENDING_PAYMENT_METADATA_KEY,
};

type HmacSha256 = Hmac<Sha256>;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Stripe webhook verification settings.
#[derive(Clone)]
pub struct StripeWebhookConfig {
    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Maximum accepted event age in seconds.
    tolerance_secs: i64,

    /// Reject test-mode events.
    require_livemode: bool,
}

impl StripeWebhookConfig {
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: SecretString::new(webhook_secret.into()),
            tolerance_secs: 300,
            require_livemode: false,
        }
    }

    pub fn with_tolerance_secs(mut self, secs: i64) -> Self {
        self.tolerance_secs = secs;
        self
    }

    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

pub struct StripeWebhookVerifier {
    config: StripeWebhookConfig,
}

impl StripeWebhookVerifier {
    pub fn new(config: StripeWebhookConfig) -> Self {
        Self { config }
    }

    /// Signature over `"{timestamp}.{payload}"` with the signing secret.
    fn expected_signature(&self, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = HmacSha256::new_from_slice(self.config.webhook_secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn verify_signature(
        &self,
        payload: &[u8],
        header: &SignatureHeader,
        now: i64,
    ) -> Result<(), WebhookError> {
        let age = now.saturating_sub(header.timestamp);

        if age > self.config.tolerance_secs {
            tracing::warn!(
                event_timestamp = header.timestamp,
                age_secs = age,
                "Webhook event too old - possible replay"
            );
            return Err(WebhookError::StaleTimestamp { age_secs: age });
        }
        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from the future"
            );
            return Err(WebhookError::StaleTimestamp { age_secs: age });
        }

        let expected = self.expected_signature(header.timestamp, payload)?;
        let matched = header
            .v1_signatures
            .iter()
            .any(|provided| bool::from(expected.as_slice().ct_eq(provided.as_slice())));

        if !matched {
            tracing::warn!(
                event_timestamp = header.timestamp,
                candidates = header.v1_signatures.len(),
                "Invalid webhook signature"
            );
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    fn parse_event(&self, payload: &[u8]) -> Result<ProviderEvent, WebhookError> {
        let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            WebhookError::MalformedPayload(e.to_string())
        })?;

        if self.config.require_livemode && !event.livemode {
            tracing::warn!(event_id = %event.id, "Rejected test mode event");
            return Err(WebhookError::LivemodeMismatch);
        }

        match event.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED | CHECKOUT_ASYNC_PAYMENT_SUCCEEDED => {
                let session: StripeCheckoutSession =
                    serde_json::from_value(event.data.object.clone())
                        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

                if !session.is_paid() {
                    tracing::info!(
                        event_id = %event.id,
                        session_id = %session.id,
                        payment_status = %session.payment_status,
                        "Checkout completed without payment yet"
                    );
                    return Ok(ProviderEvent::Unrelated(format!(
                        "{} ({})",
                        event.event_type, session.payment_status
                    )));
                }

                completion_from_session(event.id, session).map(ProviderEvent::Completion)
            }
            other => Ok(ProviderEvent::Unrelated(other.to_string())),
        }
    }
}

fn completion_from_session(
    event_id: String,
    session: StripeCheckoutSession,
) -> Result<CompletionEvent, WebhookError> {
    let record_id = session
        .pending_payment_id()
        .ok_or_else(|| WebhookError::MissingField(format!("metadata.{}", PENDING_PAYMENT_METADATA_KEY)))?
        .parse::<PaymentId>()
        .map_err(|e| WebhookError::MalformedPayload(format!("Invalid pending payment id: {}", e)))?;

    let amount_minor = match session.amount_total {
        Some(amount) => amount,
        None if session.payment_status == "no_payment_required" => 0,
        None => return Err(WebhookError::MissingField("amount_total".to_string())),
    };

    Ok(CompletionEvent {
        event_id,
        record_id,
        charged_amount: Decimal::new(amount_minor, 2),
        session_id: session.id,
    })
}

#[async_trait]
impl PaymentEventVerifier for StripeWebhookVerifier {
    async fn verify(&self, payload: &[u8], signature: &str) -> Result<ProviderEvent, WebhookError> {
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            WebhookError::MissingSignature
        })?;

        self.verify_signature(payload, &header, chrono::Utc::now().timestamp())?;

        let event = self.parse_event(payload)?;
        tracing::info!(
            kind = match &event {
                ProviderEvent::Completion(_) => "completion",
                ProviderEvent::Unrelated(_) => "unrelated",
            },
            "Webhook signature verified"
        );
        Ok(event)
    }
}

/// Builds a valid `Stripe-Signature` header. Exposed for tests.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex_encode(&mac.finalize().into_bytes()))
}
