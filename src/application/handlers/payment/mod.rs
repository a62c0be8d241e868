//! Payment command and query handlers.

mod create_pending_payment;
mod get_pending_payment;
mod lifecycle_coordinator;
mod list_pending_payments;

pub use create_pending_payment::CreatePendingPaymentHandler;
pub use get_pending_payment::{GetPendingPaymentHandler, PendingPaymentDetails};
pub use lifecycle_coordinator::{
    AdminTransitionCommand, CompleteFromProviderCommand, CompletionOutcome,
    PaymentLifecycleCoordinator,
};
pub use list_pending_payments::{ListPendingPaymentsHandler, ListPendingPaymentsQuery};
