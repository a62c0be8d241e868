//! PostgreSQL adapters - Database implementations for persistence ports.
//!
//! - `PostgresPendingPaymentStore` - Records and the atomic status transition
//! - `PostgresAuditLog` - Append-only transition history
//!
//! Schema lives in `migrations/` and is applied at startup.

mod audit_log;
mod pending_payment_store;

pub use audit_log::PostgresAuditLog;
pub use pending_payment_store::PostgresPendingPaymentStore;
