//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `PendingPaymentStore` - Records plus the conditional status transition
//! - `AuditLog` - Append-only transition history
//!
//! ## Side-Effect Ports
//!
//! - `InvoiceRenderer` - Invoice data to PDF bytes
//! - `NotificationDispatcher` - Outbound email
//!
//! ## Webhook Ports
//!
//! - `PaymentEventVerifier` - Authenticates provider callbacks

mod audit_log;
mod invoice_renderer;
mod notification_dispatcher;
mod payment_event_verifier;
mod pending_payment_store;

pub use audit_log::{AuditLog, AuditStoreError};
pub use invoice_renderer::{InvoiceRenderer, RenderError, PDF_CONTENT_TYPE};
pub use notification_dispatcher::{
    DispatchError, EmailAttachment, EmailMessage, NotificationDispatcher,
};
pub use payment_event_verifier::{
    CompletionEvent, PaymentEventVerifier, ProviderEvent, WebhookError,
};
pub use pending_payment_store::PendingPaymentStore;
