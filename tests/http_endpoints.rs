//! Integration tests for the payments HTTP API.
//!
//! Exercises the full router over in-memory adapters with
//! `tower::ServiceExt::oneshot`, including signed Stripe webhooks.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use coaching_billing::adapters::http::{payments_router, PaymentsAppState};
use coaching_billing::adapters::memory::{
    CapturingDispatcher, InMemoryAuditLog, InMemoryPendingPaymentStore,
};
use coaching_billing::adapters::stripe::{
    sign_payload, StripeWebhookConfig, StripeWebhookVerifier,
};
use coaching_billing::application::{
    AuditRecorder, CreatePendingPaymentHandler, NotificationTemplates,
    PaymentLifecycleCoordinator, RetryPolicy, SideEffectMode, SideEffectPipeline,
};
use coaching_billing::domain::payment::InvoiceDocument;
use coaching_billing::ports::{InvoiceRenderer, RenderError};

const WEBHOOK_SECRET: &str = "whsec_integration";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct NoChrome;

#[async_trait]
impl InvoiceRenderer for NoChrome {
    async fn render(&self, _invoice: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::engine_startup("not installed"))
    }

    async fn is_available(&self) -> bool {
        false
    }
}

struct TestApp {
    router: Router,
    dispatcher: Arc<CapturingDispatcher>,
}

fn app() -> TestApp {
    let store = Arc::new(InMemoryPendingPaymentStore::new());
    let audit = Arc::new(InMemoryAuditLog::new());
    let dispatcher = Arc::new(CapturingDispatcher::new());
    let pipeline = SideEffectPipeline::new(
        Arc::new(NoChrome),
        dispatcher.clone(),
        AuditRecorder::new(audit.clone(), RetryPolicy::immediate(1)),
        NotificationTemplates::new("Ana Coaching", None),
        SideEffectMode::Inline,
    );

    let state = PaymentsAppState {
        store: store.clone(),
        audit_log: audit,
        verifier: Arc::new(StripeWebhookVerifier::new(StripeWebhookConfig::new(
            WEBHOOK_SECRET,
        ))),
        intake: CreatePendingPaymentHandler::new(store.clone(), pipeline.clone(), 14),
        coordinator: PaymentLifecycleCoordinator::new(store, pipeline),
    };

    TestApp {
        router: Router::new().nest("/api", payments_router()).with_state(state),
        dispatcher,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-Admin-Id", "admin-7")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("X-Admin-Id", "admin-7")
        .body(Body::empty())
        .unwrap()
}

fn webhook_request(payload: &[u8], signature: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/webhooks/stripe")
        .header("Stripe-Signature", signature)
        .body(Body::from(payload.to_vec()))
        .unwrap()
}

fn checkout_completed(payment_id: &str, amount_cents: i64) -> Vec<u8> {
    checkout_session_event(payment_id, amount_cents, "paid")
}

fn checkout_session_event(payment_id: &str, amount_cents: i64, payment_status: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "id": "evt_123",
        "type": "checkout.session.completed",
        "created": chrono::Utc::now().timestamp(),
        "livemode": false,
        "data": {
            "object": {
                "id": "cs_test_abc",
                "object": "checkout.session",
                "amount_total": amount_cents,
                "currency": "usd",
                "payment_status": payment_status,
                "metadata": { "pending_payment_id": payment_id }
            }
        }
    }))
    .unwrap()
}

fn amount(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn signed(payload: &[u8]) -> String {
    sign_payload(WEBHOOK_SECRET, chrono::Utc::now().timestamp(), payload)
}

async fn create_payment(app: &TestApp) -> String {
    let (status, body) = send(
        &app.router,
        json_request(
            "POST",
            "/api/payments",
            json!({
                "client_email": "client@example.com",
                "client_name": "Jordan Client",
                "base_amount": "100.00",
                "description": "Coaching package"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Intake
// =============================================================================

#[tokio::test]
async fn intake_creates_pending_payment() {
    let app = app();
    let (status, body) = send(
        &app.router,
        json_request(
            "POST",
            "/api/payments",
            json!({
                "client_email": "client@example.com",
                "client_name": "Jordan Client",
                "base_amount": 250,
                "description": "Coaching package",
                "notes": "Referred by Sam"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["bonus_amount"], "0");
    assert!(body["invoice_number"].as_str().unwrap().starts_with("INV-"));
    assert_eq!(app.dispatcher.sent().len(), 1);
}

#[tokio::test]
async fn intake_rejects_non_positive_amount() {
    let app = app();
    let (status, body) = send(
        &app.router,
        json_request(
            "POST",
            "/api/payments",
            json!({
                "client_email": "client@example.com",
                "client_name": "Jordan Client",
                "base_amount": "0",
                "description": "Coaching package"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(app.dispatcher.sent().is_empty());
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn admin_endpoints_require_identity() {
    let app = app();
    let request = Request::builder()
        .uri("/api/admin/payments")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_transition_and_detail_view() {
    let app = app();
    let id = create_payment(&app).await;

    let (status, body) = send(
        &app.router,
        json_request(
            "POST",
            &format!("/api/admin/payments/{id}/status"),
            json!({ "status": "overdue" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "overdue");

    let (status, body) = send(&app.router, admin_get(&format!("/api/admin/payments/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["audit_trail"].as_array().unwrap().len(), 1);
    assert_eq!(body["audit_trail"][0]["actor"], "admin:admin-7");
    assert_eq!(body["audit_trail"][0]["new_status"], "overdue");
}

#[tokio::test]
async fn admin_invalid_transition_is_409() {
    let app = app();
    let id = create_payment(&app).await;
    let uri = format!("/api/admin/payments/{id}/status");

    send(&app.router, json_request("POST", &uri, json!({ "status": "cancelled" }))).await;
    let (status, body) =
        send(&app.router, json_request("POST", &uri, json!({ "status": "completed" }))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE_TRANSITION");
}

#[tokio::test]
async fn admin_list_filters_by_status() {
    let app = app();
    let first = create_payment(&app).await;
    create_payment(&app).await;
    send(
        &app.router,
        json_request(
            "POST",
            &format!("/api/admin/payments/{first}/status"),
            json!({ "status": "cancelled" }),
        ),
    )
    .await;

    let (_, all) = send(&app.router, admin_get("/api/admin/payments")).await;
    let (_, cancelled) = send(&app.router, admin_get("/api/admin/payments?status=cancelled")).await;
    let (status, _) = send(&app.router, admin_get("/api/admin/payments?status=refunded")).await;

    assert_eq!(all["total"], 2);
    assert_eq!(cancelled["total"], 1);
    assert_eq!(cancelled["payments"][0]["id"], first);
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_payment_is_404_and_bad_id_is_400() {
    let app = app();

    let (status, body) = send(
        &app.router,
        admin_get(&format!("/api/admin/payments/{}", uuid::Uuid::new_v4())),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PAYMENT_NOT_FOUND");

    let (status, _) = send(&app.router, admin_get("/api/admin/payments/not-an-id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Webhook
// =============================================================================

#[tokio::test]
async fn signed_webhook_completes_payment_once() {
    let app = app();
    let id = create_payment(&app).await;
    let payload = checkout_completed(&id, 12_500);

    let (status, body) = send(&app.router, webhook_request(&payload, &signed(&payload))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "completed");

    let (status, body) = send(&app.router, webhook_request(&payload, &signed(&payload))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "already_completed");

    let (_, detail) = send(&app.router, admin_get(&format!("/api/admin/payments/{id}"))).await;
    assert_eq!(detail["status"], "completed");
    assert_eq!(detail["bonus_amount"], "25.00");
    assert_eq!(detail["total_amount"], "125.00");
    assert_eq!(detail["provider_session_id"], "cs_test_abc");
    assert_eq!(detail["audit_trail"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn webhook_for_cancelled_payment_is_acknowledged_but_ignored() {
    let app = app();
    let id = create_payment(&app).await;
    send(
        &app.router,
        json_request(
            "POST",
            &format!("/api/admin/payments/{id}/status"),
            json!({ "status": "cancelled" }),
        ),
    )
    .await;
    let payload = checkout_completed(&id, 10_000);

    let (status, body) = send(&app.router, webhook_request(&payload, &signed(&payload))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "ignored");
}

#[tokio::test]
async fn free_checkout_webhook_completes_at_base_amount() {
    let app = app();
    let id = create_payment(&app).await;
    let payload = checkout_session_event(&id, 0, "no_payment_required");

    let (status, body) = send(&app.router, webhook_request(&payload, &signed(&payload))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "completed");

    let (status, body) = send(&app.router, webhook_request(&payload, &signed(&payload))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "already_completed");

    let (_, detail) = send(&app.router, admin_get(&format!("/api/admin/payments/{id}"))).await;
    assert_eq!(detail["status"], "completed");
    assert_eq!(amount(&detail["bonus_amount"]), Decimal::ZERO);
    assert_eq!(amount(&detail["total_amount"]), Decimal::new(100, 0));
    assert_eq!(detail["audit_trail"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn webhook_with_out_of_range_timestamp_is_401() {
    let app = app();

    let (status, body) = send(
        &app.router,
        webhook_request(b"{}", "t=-9223372036854775808,v1=abcd"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_WEBHOOK_SIGNATURE");
}

#[tokio::test]
async fn webhook_with_bad_signature_is_401() {
    let app = app();
    let id = create_payment(&app).await;
    let payload = checkout_completed(&id, 10_000);
    let forged = sign_payload("whsec_attacker", chrono::Utc::now().timestamp(), &payload);

    let (status, body) = send(&app.router, webhook_request(&payload, &forged)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_WEBHOOK_SIGNATURE");
}

#[tokio::test]
async fn webhook_without_signature_is_401() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks/stripe")
        .body(Body::from("{}"))
        .unwrap();

    let (status, _) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unrelated_event_is_acknowledged() {
    let app = app();
    let payload = serde_json::to_vec(&json!({
        "id": "evt_9",
        "type": "invoice.created",
        "created": 1,
        "livemode": false,
        "data": { "object": {} }
    }))
    .unwrap();

    let (status, body) = send(&app.router, webhook_request(&payload, &signed(&payload))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "unhandled_event");
}
