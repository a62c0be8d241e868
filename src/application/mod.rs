//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers write through the store; everything that follows a
//! committed write goes through the side-effect pipeline.

mod audit_recorder;
pub mod handlers;
mod notifications;
mod side_effects;

pub use audit_recorder::{AuditOutcome, AuditRecorder, RetryPolicy};
pub use handlers::{
    AdminTransitionCommand, CompleteFromProviderCommand, CompletionOutcome,
    CreatePendingPaymentHandler, GetPendingPaymentHandler, ListPendingPaymentsHandler,
    ListPendingPaymentsQuery, PaymentLifecycleCoordinator, PendingPaymentDetails,
};
pub use notifications::{escape_html, NotificationTemplates};
pub use side_effects::{SideEffectMode, SideEffectPipeline};
