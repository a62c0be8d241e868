//! Payment domain module.
//!
//! Pending payments (invoices awaiting client payment), their status state
//! machine, the audit trail of transitions and the invoice document model.
//!
//! # Module Structure
//!
//! - `aggregate` - PendingPayment aggregate and the changes applied to it
//! - `status` - PaymentStatus state machine
//! - `audit` - AuditEntry and Actor
//! - `invoice` - InvoiceDocument and currency formatting
//! - `errors` - PaymentError

mod aggregate;
mod audit;
mod errors;
mod invoice;
mod status;

pub use aggregate::{CompletionAmounts, NewPendingPayment, PendingPayment, StatusChange};
pub use audit::{Actor, AuditEntry};
pub use errors::PaymentError;
pub use invoice::{
    format_currency, ClientIdentity, InvoiceDocument, LineItem, BONUS_LINE_DESCRIPTION,
};
pub use status::PaymentStatus;
