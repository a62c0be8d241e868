//! Side effects that follow a committed write.
//!
//! Rendering, email and audit run after the store has accepted a change.
//! Each step is isolated: a failure is logged and the next step still runs.
//! Nothing here can fail the operation that triggered it.

use std::sync::Arc;

use crate::domain::payment::{Actor, AuditEntry, InvoiceDocument, PaymentStatus, PendingPayment};
use crate::ports::{
    EmailAttachment, EmailMessage, InvoiceRenderer, NotificationDispatcher, PDF_CONTENT_TYPE,
};

use super::audit_recorder::AuditRecorder;
use super::notifications::NotificationTemplates;

/// Where side effects execute relative to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SideEffectMode {
    /// Spawned onto the runtime; the caller returns as soon as the write commits.
    #[default]
    Detached,
    /// Awaited before returning. Deterministic, used by tests.
    Inline,
}

impl SideEffectMode {
    pub fn from_detached_flag(detached: bool) -> Self {
        if detached {
            SideEffectMode::Detached
        } else {
            SideEffectMode::Inline
        }
    }
}

/// Runs the post-write pipeline.
#[derive(Clone)]
pub struct SideEffectPipeline {
    renderer: Arc<dyn InvoiceRenderer>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    audit: AuditRecorder,
    templates: NotificationTemplates,
    mode: SideEffectMode,
    attach_pdf_to_issued_invoice: bool,
}

impl SideEffectPipeline {
    pub fn new(
        renderer: Arc<dyn InvoiceRenderer>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        audit: AuditRecorder,
        templates: NotificationTemplates,
        mode: SideEffectMode,
    ) -> Self {
        Self {
            renderer,
            dispatcher,
            audit,
            templates,
            mode,
            attach_pdf_to_issued_invoice: false,
        }
    }

    pub fn with_pdf_on_issued_invoice(mut self, attach: bool) -> Self {
        self.attach_pdf_to_issued_invoice = attach;
        self
    }

    /// Effects of a new record: the invoice-issued email.
    pub async fn after_creation(&self, payment: PendingPayment) {
        match self.mode {
            SideEffectMode::Inline => self.send_issued_invoice(&payment).await,
            SideEffectMode::Detached => {
                let pipeline = self.clone();
                tokio::spawn(async move { pipeline.send_issued_invoice(&payment).await });
            }
        }
    }

    /// Effects of an accepted transition `previous -> payment.status`.
    pub async fn after_transition(
        &self,
        previous: PaymentStatus,
        payment: PendingPayment,
        actor: Actor,
    ) {
        match self.mode {
            SideEffectMode::Inline => self.run_transition_effects(previous, &payment, actor).await,
            SideEffectMode::Detached => {
                let pipeline = self.clone();
                tokio::spawn(async move {
                    pipeline
                        .run_transition_effects(previous, &payment, actor)
                        .await
                });
            }
        }
    }

    async fn run_transition_effects(
        &self,
        previous: PaymentStatus,
        payment: &PendingPayment,
        actor: Actor,
    ) {
        match payment.status {
            PaymentStatus::Completed => {
                let pdf = self.render(&InvoiceDocument::paid(payment)).await;
                let message = self.templates.payment_confirmed(payment, pdf.is_some());
                self.send(attach(message, pdf), payment, "payment_confirmed")
                    .await;
            }
            PaymentStatus::Cancelled => {
                let message = self.templates.payment_cancelled(payment);
                self.send(message, payment, "payment_cancelled").await;
            }
            PaymentStatus::Overdue => {
                let message = self.templates.payment_overdue(payment);
                self.send(message, payment, "payment_overdue").await;
            }
            PaymentStatus::Pending => {}
        }

        let entry = AuditEntry::for_transition(previous, payment, actor);
        self.audit.record(&entry).await;
    }

    async fn send_issued_invoice(&self, payment: &PendingPayment) {
        let pdf = if self.attach_pdf_to_issued_invoice {
            self.render(&InvoiceDocument::issued(payment)).await
        } else {
            None
        };
        let message = self.templates.invoice_issued(payment);
        self.send(attach(message, pdf), payment, "invoice_issued")
            .await;
    }

    /// Renders the invoice, logging and discarding any failure.
    async fn render(&self, document: &InvoiceDocument) -> Option<(String, Vec<u8>)> {
        match self.renderer.render(document).await {
            Ok(bytes) => Some((document.pdf_filename(), bytes)),
            Err(e) => {
                tracing::warn!(
                    invoice_number = %document.invoice_number,
                    error = %e,
                    "Invoice rendering failed, sending email without PDF"
                );
                None
            }
        }
    }

    async fn send(&self, message: EmailMessage, payment: &PendingPayment, template: &'static str) {
        match self.dispatcher.send(&message).await {
            Ok(()) => tracing::info!(
                payment_id = %payment.id,
                template,
                attachment = message.has_attachment(),
                "Notification sent"
            ),
            Err(e) => tracing::warn!(
                payment_id = %payment.id,
                template,
                error = %e,
                "Notification delivery failed"
            ),
        }
    }
}

fn attach(message: EmailMessage, pdf: Option<(String, Vec<u8>)>) -> EmailMessage {
    match pdf {
        Some((filename, content)) => message.with_attachment(EmailAttachment {
            filename,
            content,
            content_type: PDF_CONTENT_TYPE.to_string(),
        }),
        None => message,
    }
}
