//! Stripe adapter - signed webhook verification.

mod webhook_types;
mod webhook_verifier;

pub use webhook_types::{
    SignatureHeader, SignatureParseError, StripeCheckoutSession, StripeWebhookEvent,
    PENDING_PAYMENT_METADATA_KEY,
};
pub use webhook_verifier::{sign_payload, StripeWebhookConfig, StripeWebhookVerifier};
