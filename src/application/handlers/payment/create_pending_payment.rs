//! CreatePendingPaymentHandler - public intake of new invoices.

use std::sync::Arc;

use crate::application::side_effects::SideEffectPipeline;
use crate::domain::foundation::{PaymentId, Timestamp};
use crate::domain::payment::{NewPendingPayment, PaymentError, PendingPayment};
use crate::ports::PendingPaymentStore;

/// Handler for creating pending payments.
///
/// Persists the record, then fires the invoice-issued email. Email failure
/// never fails the creation.
#[derive(Clone)]
pub struct CreatePendingPaymentHandler {
    store: Arc<dyn PendingPaymentStore>,
    side_effects: SideEffectPipeline,
    payment_terms_days: u32,
}

impl CreatePendingPaymentHandler {
    pub fn new(
        store: Arc<dyn PendingPaymentStore>,
        side_effects: SideEffectPipeline,
        payment_terms_days: u32,
    ) -> Self {
        Self {
            store,
            side_effects,
            payment_terms_days,
        }
    }

    pub async fn handle(&self, cmd: NewPendingPayment) -> Result<PendingPayment, PaymentError> {
        let payment = PendingPayment::create(
            PaymentId::new(),
            cmd,
            Timestamp::now(),
            self.payment_terms_days,
        )?;

        self.store.create(&payment).await?;

        tracing::info!(
            payment_id = %payment.id,
            invoice_number = %payment.invoice_number,
            base_amount = %payment.base_amount,
            "Pending payment created"
        );

        self.side_effects.after_creation(payment.clone()).await;
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        CapturingDispatcher, InMemoryAuditLog, InMemoryPendingPaymentStore,
    };
    use crate::application::{AuditRecorder, NotificationTemplates, RetryPolicy, SideEffectMode};
    use crate::domain::payment::{InvoiceDocument, PaymentStatus};
    use crate::ports::{InvoiceRenderer, RenderError};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct StubRenderer {
        fail: bool,
    }

    #[async_trait]
    impl InvoiceRenderer for StubRenderer {
        async fn render(&self, _invoice: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
            if self.fail {
                Err(RenderError::render_to_bytes("blank page"))
            } else {
                Ok(b"%PDF-1.4".to_vec())
            }
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn handler(
        store: Arc<InMemoryPendingPaymentStore>,
        dispatcher: Arc<CapturingDispatcher>,
        renderer_fails: bool,
        attach_pdf: bool,
    ) -> CreatePendingPaymentHandler {
        let pipeline = SideEffectPipeline::new(
            Arc::new(StubRenderer {
                fail: renderer_fails,
            }),
            dispatcher,
            AuditRecorder::new(Arc::new(InMemoryAuditLog::new()), RetryPolicy::immediate(1)),
            NotificationTemplates::new("Coaching", Some("https://example.com/pay".into())),
            SideEffectMode::Inline,
        )
        .with_pdf_on_issued_invoice(attach_pdf);
        CreatePendingPaymentHandler::new(store, pipeline, 14)
    }

    fn cmd(base: Decimal) -> NewPendingPayment {
        NewPendingPayment {
            client_email: "new@example.com".to_string(),
            client_name: "New Client".to_string(),
            base_amount: base,
            description: "Discovery session".to_string(),
            notes: Some("referred by Pat".to_string()),
        }
    }

    #[tokio::test]
    async fn creates_pending_record_and_sends_invoice() {
        let store = Arc::new(InMemoryPendingPaymentStore::new());
        let dispatcher = Arc::new(CapturingDispatcher::new());
        let handler = handler(store.clone(), dispatcher.clone(), false, false);

        let payment = handler.handle(cmd(dec!(150))).await.unwrap();

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.total_amount, dec!(150));
        assert_eq!(payment.due_date, payment.created_at.add_days(14));
        assert_eq!(store.get_by_id(&payment.id).await.unwrap(), payment);

        let sent = dispatcher.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "new@example.com");
        assert!(sent[0].html.contains(&format!("?payment={}", payment.id)));
        assert!(!sent[0].has_attachment());
    }

    #[tokio::test]
    async fn attaches_pdf_when_enabled() {
        let dispatcher = Arc::new(CapturingDispatcher::new());
        let handler = handler(
            Arc::new(InMemoryPendingPaymentStore::new()),
            dispatcher.clone(),
            false,
            true,
        );

        let payment = handler.handle(cmd(dec!(150))).await.unwrap();

        let sent = dispatcher.sent();
        let attachment = sent[0].attachment.as_ref().unwrap();
        assert_eq!(attachment.filename, format!("invoice-{}.pdf", payment.invoice_number));
        assert_eq!(attachment.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn render_failure_still_sends_invoice() {
        let dispatcher = Arc::new(CapturingDispatcher::new());
        let handler = handler(
            Arc::new(InMemoryPendingPaymentStore::new()),
            dispatcher.clone(),
            true,
            true,
        );

        handler.handle(cmd(dec!(150))).await.unwrap();

        let sent = dispatcher.sent();
        assert_eq!(sent.len(), 1);
        assert!(!sent[0].has_attachment());
    }

    #[tokio::test]
    async fn email_failure_does_not_fail_creation() {
        let store = Arc::new(InMemoryPendingPaymentStore::new());
        let dispatcher = Arc::new(CapturingDispatcher::new());
        dispatcher.fail_next_sends(1);
        let handler = handler(store.clone(), dispatcher, false, false);

        let payment = handler.handle(cmd(dec!(150))).await.unwrap();

        assert!(store.get_by_id(&payment.id).await.is_ok());
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_write() {
        let store = Arc::new(InMemoryPendingPaymentStore::new());
        let dispatcher = Arc::new(CapturingDispatcher::new());
        let handler = handler(store.clone(), dispatcher.clone(), false, false);

        let err = handler.handle(cmd(dec!(-5))).await.unwrap_err();

        assert!(matches!(err, PaymentError::ValidationFailed { ref field, .. } if field == "base_amount"));
        assert!(store.list(None).await.unwrap().is_empty());
        assert!(dispatcher.sent().is_empty());
    }
}
