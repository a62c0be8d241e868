//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - Pending payment store and audit log (sqlx)
//! - `memory` - In-memory store, audit log and capturing mail sink
//! - `pdf` - Invoice HTML template and headless Chrome renderer
//! - `email` - Resend dispatcher
//! - `stripe` - Signed webhook verification
//! - `http` - Axum routes

pub mod email;
pub mod http;
pub mod memory;
pub mod pdf;
pub mod postgres;
pub mod stripe;

pub use email::{ResendConfig, ResendDispatcher};
pub use memory::{CapturingDispatcher, InMemoryAuditLog, InMemoryPendingPaymentStore};
pub use pdf::ChromePdfRenderer;
pub use postgres::{PostgresAuditLog, PostgresPendingPaymentStore};
pub use stripe::{StripeWebhookConfig, StripeWebhookVerifier};
