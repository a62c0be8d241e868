//! HTTP handlers for pending-payment endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequestParts, Json, Path, Query, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::{
    AdminTransitionCommand, CreatePendingPaymentHandler, GetPendingPaymentHandler,
    ListPendingPaymentsHandler, ListPendingPaymentsQuery, PaymentLifecycleCoordinator,
};
use crate::domain::foundation::{ErrorCode, PaymentId};
use crate::domain::payment::{PaymentError, PaymentStatus};
use crate::ports::{
    AuditLog, PaymentEventVerifier, PendingPaymentStore, ProviderEvent, WebhookError,
};

use super::dto::{
    AdminStatusRequest, CreatePaymentRequest, ErrorResponse, ListPaymentsParams,
    PaymentDetailsResponse, PaymentListResponse, PaymentResponse, WebhookResponse,
};

/// Header carrying the Stripe signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Header identifying the admin performing a change.
pub const ADMIN_ID_HEADER: &str = "X-Admin-Id";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned for each request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub store: Arc<dyn PendingPaymentStore>,
    pub audit_log: Arc<dyn AuditLog>,
    pub verifier: Arc<dyn PaymentEventVerifier>,
    pub intake: CreatePendingPaymentHandler,
    pub coordinator: PaymentLifecycleCoordinator,
}

impl PaymentsAppState {
    pub fn get_payment_handler(&self) -> GetPendingPaymentHandler {
        GetPendingPaymentHandler::new(self.store.clone(), self.audit_log.clone())
    }

    pub fn list_payments_handler(&self) -> ListPendingPaymentsHandler {
        ListPendingPaymentsHandler::new(self.store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Admin Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Admin identity extracted from the request.
///
/// Session handling lives in front of this service; it forwards the
/// authenticated admin id in `X-Admin-Id`.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub admin_id: String,
}

/// Rejection type for AdminUser extraction.
pub struct AdminRequired;

impl IntoResponse for AdminRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Admin identity is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AdminRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin_id = parts
            .headers
            .get(ADMIN_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AdminRequired)?;

        Ok(AdminUser {
            admin_id: admin_id.to_string(),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Public Intake
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments - Create a pending payment and email the invoice
pub async fn create_payment(
    State(state): State<PaymentsAppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let payment = state.intake.handle(request.into()).await?;
    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

// ════════════════════════════════════════════════════════════════════════════════
// Admin Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/admin/payments - List payments, optionally filtered by status
pub async fn list_payments(
    State(state): State<PaymentsAppState>,
    _admin: AdminUser,
    Query(params): Query<ListPaymentsParams>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<PaymentStatus>)
        .transpose()
        .map_err(PaymentError::from)?;

    let payments = state
        .list_payments_handler()
        .handle(ListPendingPaymentsQuery { status })
        .await?;

    Ok(Json(PaymentListResponse::from(payments)))
}

/// GET /api/admin/payments/:id - Payment with its audit trail
pub async fn get_payment(
    State(state): State<PaymentsAppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let id = parse_payment_id(&id)?;
    let details = state.get_payment_handler().handle(id).await?;
    Ok(Json(PaymentDetailsResponse::from(details)))
}

/// POST /api/admin/payments/:id/status - Manual status change
pub async fn update_payment_status(
    State(state): State<PaymentsAppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(request): Json<AdminStatusRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let cmd = AdminTransitionCommand {
        record_id: parse_payment_id(&id)?,
        target: request.status,
        admin_id: admin.admin_id,
    };

    let updated = state.coordinator.apply_admin_transition(cmd).await?;
    Ok(Json(PaymentResponse::from(updated)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Provider Webhook
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - Handle Stripe webhook events
///
/// Verified against the raw body. Completion of an already completed record is
/// acknowledged with 200 so the provider stops redelivering.
pub async fn handle_stripe_webhook(
    State(state): State<PaymentsAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, PaymentApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingSignature)?;

    match state.verifier.verify(&body, signature).await? {
        ProviderEvent::Completion(event) => {
            tracing::info!(
                event_id = %event.event_id,
                payment_id = %event.record_id,
                "Processing provider completion"
            );
            let outcome = state.coordinator.complete_from_provider(event.into()).await?;
            Ok(Json(WebhookResponse::new(outcome.label())))
        }
        ProviderEvent::Unrelated(event_type) => {
            tracing::debug!(event_type = %event_type, "Unhandled webhook event type");
            Ok(Json(WebhookResponse::new("unhandled_event")))
        }
    }
}

fn parse_payment_id(raw: &str) -> Result<PaymentId, PaymentError> {
    raw.parse()
        .map_err(|_| PaymentError::validation("id", format!("'{}' is not a valid payment id", raw)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub enum PaymentApiError {
    Payment(PaymentError),
    Webhook(WebhookError),
}

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self::Payment(err)
    }
}

impl From<WebhookError> for PaymentApiError {
    fn from(err: WebhookError) -> Self {
        Self::Webhook(err)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            PaymentApiError::Payment(err) => {
                let status = match err {
                    PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
                    PaymentError::InvalidTransition { .. } | PaymentError::Conflict { .. } => {
                        StatusCode::CONFLICT
                    }
                    PaymentError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
                    PaymentError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let code = match err {
                    PaymentError::Infrastructure(_) => ErrorCode::InternalError,
                    other => other.code(),
                };
                if status.is_server_error() {
                    tracing::error!(error = %err, "Payment request failed");
                }
                // Infrastructure detail stays in the logs
                let message = match err {
                    PaymentError::Infrastructure(_) => "Internal server error".to_string(),
                    other => other.to_string(),
                };
                (status, code, message)
            }
            PaymentApiError::Webhook(err) => {
                tracing::warn!(error = %err, "Rejected webhook");
                if err.is_authentication_failure() {
                    (
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::InvalidWebhookSignature,
                        err.to_string(),
                    )
                } else {
                    (StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed, err.to_string())
                }
            }
        };

        (status, Json(ErrorResponse::new(code.to_string(), message))).into_response()
    }
}
