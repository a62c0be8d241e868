//! Axum router configuration for pending-payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_payment, get_payment, handle_stripe_webhook, list_payments, update_payment_status,
    PaymentsAppState,
};

/// Public intake routes.
///
/// # Routes
/// - `POST /` - Create a pending payment
pub fn intake_routes() -> Router<PaymentsAppState> {
    Router::new().route("/", post(create_payment))
}

/// Admin routes (require `X-Admin-Id`).
///
/// # Routes
/// - `GET /` - List payments (`?status=` filter)
/// - `GET /:id` - Payment with audit trail
/// - `POST /:id/status` - Manual status change
pub fn admin_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/", get(list_payments))
        .route("/:id", get(get_payment))
        .route("/:id/status", post(update_payment_status))
}

/// Webhook routes. No user auth; the signature is verified instead.
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks
pub fn webhook_routes() -> Router<PaymentsAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Complete payments router, suitable for mounting at `/api`.
///
/// ```ignore
/// let app = Router::new()
///     .nest("/api", payments_router())
///     .with_state(app_state);
/// ```
pub fn payments_router() -> Router<PaymentsAppState> {
    Router::new()
        .nest("/payments", intake_routes())
        .nest("/admin/payments", admin_routes())
        .nest("/webhooks", webhook_routes())
}
