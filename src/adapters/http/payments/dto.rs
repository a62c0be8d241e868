//! HTTP DTOs (Data Transfer Objects) for pending-payment endpoints.
//!
//! These types define the JSON request/response structure for the payments API.
//! Amounts are serialized as decimal strings so no precision is lost.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::PendingPaymentDetails;
use crate::domain::foundation::Timestamp;
use crate::domain::payment::{AuditEntry, NewPendingPayment, PaymentStatus, PendingPayment};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Public intake request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentRequest {
    pub client_email: String,
    pub client_name: String,
    /// Amount owed, in major currency units. Accepts a JSON number or string.
    pub base_amount: Decimal,
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<CreatePaymentRequest> for NewPendingPayment {
    fn from(request: CreatePaymentRequest) -> Self {
        NewPendingPayment {
            client_email: request.client_email,
            client_name: request.client_name,
            base_amount: request.base_amount,
            description: request.description,
            notes: request.notes,
        }
    }
}

/// Admin request to move a payment to a new status.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminStatusRequest {
    pub status: PaymentStatus,
}

/// Query string for the admin list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPaymentsParams {
    /// Optional status filter, e.g. `?status=overdue`.
    #[serde(default)]
    pub status: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A pending payment as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub invoice_number: String,
    pub client_email: String,
    pub client_name: String,
    pub base_amount: Decimal,
    pub bonus_amount: Decimal,
    pub total_amount: Decimal,
    pub description: String,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_session_id: Option<String>,
    /// ISO 8601.
    pub due_date: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn iso(ts: &Timestamp) -> String {
    ts.as_datetime().to_rfc3339()
}

impl From<PendingPayment> for PaymentResponse {
    fn from(p: PendingPayment) -> Self {
        Self {
            id: p.id.to_string(),
            due_date: iso(&p.due_date),
            created_at: iso(&p.created_at),
            updated_at: iso(&p.updated_at),
            invoice_number: p.invoice_number,
            client_email: p.client_email,
            client_name: p.client_name,
            base_amount: p.base_amount,
            bonus_amount: p.bonus_amount,
            total_amount: p.total_amount,
            description: p.description,
            status: p.status,
            provider_session_id: p.provider_session_id,
            notes: p.notes,
        }
    }
}

/// One audit trail row.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntryResponse {
    pub id: String,
    pub previous_status: PaymentStatus,
    pub new_status: PaymentStatus,
    pub amount: Decimal,
    pub bonus_amount: Decimal,
    /// `system` or `admin:<id>`.
    pub actor: String,
    pub timestamp: String,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(e: AuditEntry) -> Self {
        Self {
            id: e.id.to_string(),
            previous_status: e.previous_status,
            new_status: e.new_status,
            amount: e.amount,
            bonus_amount: e.bonus_amount,
            actor: e.actor.as_storage_string(),
            timestamp: iso(&e.timestamp),
        }
    }
}

/// Admin detail view: the record and its audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentDetailsResponse {
    #[serde(flatten)]
    pub payment: PaymentResponse,
    pub audit_trail: Vec<AuditEntryResponse>,
}

impl From<PendingPaymentDetails> for PaymentDetailsResponse {
    fn from(details: PendingPaymentDetails) -> Self {
        Self {
            payment: PaymentResponse::from(details.payment),
            audit_trail: details
                .audit_trail
                .into_iter()
                .map(AuditEntryResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentListResponse {
    pub payments: Vec<PaymentResponse>,
    pub total: usize,
}

impl From<Vec<PendingPayment>> for PaymentListResponse {
    fn from(payments: Vec<PendingPayment>) -> Self {
        let total = payments.len();
        Self {
            payments: payments.into_iter().map(PaymentResponse::from).collect(),
            total,
        }
    }
}

/// Acknowledgement returned to the payment provider.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    /// `completed`, `already_completed`, `ignored` or `unhandled_event`.
    pub outcome: String,
}

impl WebhookResponse {
    pub fn new(outcome: impl Into<String>) -> Self {
        Self {
            received: true,
            outcome: outcome.into(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PaymentId;
    use crate::domain::payment::Actor;
    use rust_decimal_macros::dec;

    fn payment() -> PendingPayment {
        PendingPayment::create(
            PaymentId::new(),
            NewPendingPayment {
                client_email: "ana@example.com".to_string(),
                client_name: "Ana".to_string(),
                base_amount: dec!(100),
                description: "Coaching package".to_string(),
                notes: None,
            },
            Timestamp::now(),
            14,
        )
        .unwrap()
    }

    #[test]
    fn create_request_accepts_numeric_and_string_amounts() {
        let numeric: CreatePaymentRequest = serde_json::from_str(
            r#"{"client_email":"a@b.c","client_name":"A","base_amount":150.5,"description":"d"}"#,
        )
        .unwrap();
        let string: CreatePaymentRequest = serde_json::from_str(
            r#"{"client_email":"a@b.c","client_name":"A","base_amount":"150.50","description":"d"}"#,
        )
        .unwrap();

        assert_eq!(numeric.base_amount, dec!(150.5));
        assert_eq!(string.base_amount, dec!(150.50));
        assert!(string.notes.is_none());
    }

    #[test]
    fn admin_request_parses_snake_case_status() {
        let request: AdminStatusRequest = serde_json::from_str(r#"{"status":"overdue"}"#).unwrap();
        assert_eq!(request.status, PaymentStatus::Overdue);
    }

    #[test]
    fn payment_response_serializes_amounts_as_strings() {
        let json = serde_json::to_value(PaymentResponse::from(payment())).unwrap();

        assert_eq!(json["status"], "pending");
        assert_eq!(json["base_amount"], "100");
        assert!(json["invoice_number"].as_str().unwrap().starts_with("INV-"));
        assert!(json.get("provider_session_id").is_none());
    }

    #[test]
    fn details_response_flattens_payment() {
        let p = payment();
        let entry = AuditEntry::for_transition(PaymentStatus::Pending, &p, Actor::admin("admin-1"));
        let json = serde_json::to_value(PaymentDetailsResponse::from(PendingPaymentDetails {
            payment: p.clone(),
            audit_trail: vec![entry],
        }))
        .unwrap();

        assert_eq!(json["id"], p.id.to_string());
        assert_eq!(json["audit_trail"][0]["actor"], "admin:admin-1");
    }
}
