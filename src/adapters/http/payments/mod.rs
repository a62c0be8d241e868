//! HTTP adapter for pending-payment endpoints.
//!
//! - `POST /api/payments` - Public intake
//! - `GET /api/admin/payments` - List payments
//! - `GET /api/admin/payments/:id` - Payment with audit trail
//! - `POST /api/admin/payments/:id/status` - Manual status change
//! - `POST /api/webhooks/stripe` - Provider completion events

pub mod dto;
mod handlers;
mod routes;

pub use dto::*;
pub use handlers::{
    AdminUser, PaymentApiError, PaymentsAppState, ADMIN_ID_HEADER, STRIPE_SIGNATURE_HEADER,
};
pub use routes::{admin_routes, intake_routes, payments_router, webhook_routes};
