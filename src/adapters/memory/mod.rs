//! In-memory adapters for tests and local runs.

mod audit_log;
mod capturing_dispatcher;
mod pending_payment_store;

pub use audit_log::InMemoryAuditLog;
pub use capturing_dispatcher::CapturingDispatcher;
pub use pending_payment_store::InMemoryPendingPaymentStore;
