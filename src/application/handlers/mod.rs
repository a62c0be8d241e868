//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod payment;

pub use payment::{
    AdminTransitionCommand, CompleteFromProviderCommand, CompletionOutcome,
    CreatePendingPaymentHandler, GetPendingPaymentHandler, ListPendingPaymentsHandler,
    ListPendingPaymentsQuery, PaymentLifecycleCoordinator, PendingPaymentDetails,
};
