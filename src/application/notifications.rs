//! Email templates for the payment lifecycle.
//!
//! Each template turns a record into a ready-to-send [`EmailMessage`]. All
//! user-supplied text is HTML-escaped.

use crate::domain::payment::{format_currency, PendingPayment};
use crate::ports::EmailMessage;

/// Builds lifecycle emails.
#[derive(Debug, Clone)]
pub struct NotificationTemplates {
    business_name: String,
    payment_page_url: Option<String>,
}

impl NotificationTemplates {
    pub fn new(business_name: impl Into<String>, payment_page_url: Option<String>) -> Self {
        Self {
            business_name: business_name.into(),
            payment_page_url: payment_page_url
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
        }
    }

    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    /// Link the client follows to pay, when a payment page is configured.
    pub fn payment_link(&self, payment: &PendingPayment) -> Option<String> {
        self.payment_page_url
            .as_ref()
            .map(|base| format!("{}?payment={}", base, payment.id))
    }

    /// Sent when a new invoice is created.
    pub fn invoice_issued(&self, payment: &PendingPayment) -> EmailMessage {
        let link = match self.payment_link(payment) {
            Some(url) => format!(
                r#"<p><a href="{url}" style="{BUTTON_STYLE}">Pay invoice</a></p>"#,
                url = escape_html(&url),
                BUTTON_STYLE = BUTTON_STYLE,
            ),
            None => String::new(),
        };
        let body = format!(
            "<p>Hi {name},</p>\
             <p>Here is your invoice <strong>{number}</strong> for {description}.</p>\
             <p>Amount due: <strong>{amount}</strong><br>Due date: {due}</p>\
             {link}",
            name = escape_html(&payment.client_name),
            number = escape_html(&payment.invoice_number),
            description = escape_html(&payment.description),
            amount = format_currency(payment.base_amount),
            due = payment.due_date.long_date(),
            link = link,
        );
        EmailMessage::new(
            &payment.client_email,
            format!("Invoice {} from {}", payment.invoice_number, self.business_name),
            self.layout(&body),
        )
    }

    /// Sent once a payment completes.
    pub fn payment_confirmed(&self, payment: &PendingPayment, has_pdf: bool) -> EmailMessage {
        let bonus = if payment.bonus_amount > rust_decimal::Decimal::ZERO {
            format!(
                "<p>This includes an additional contribution of {}. Thank you!</p>",
                format_currency(payment.bonus_amount)
            )
        } else {
            String::new()
        };
        let attachment_note = if has_pdf {
            "<p>Your invoice is attached for your records.</p>"
        } else {
            ""
        };
        let body = format!(
            "<p>Hi {name},</p>\
             <p>We received your payment of <strong>{total}</strong> for invoice {number}.</p>\
             {bonus}{attachment_note}",
            name = escape_html(&payment.client_name),
            total = format_currency(payment.total_amount),
            number = escape_html(&payment.invoice_number),
            bonus = bonus,
            attachment_note = attachment_note,
        );
        EmailMessage::new(
            &payment.client_email,
            format!("Payment received - {}", payment.invoice_number),
            self.layout(&body),
        )
    }

    /// Sent when an invoice is cancelled.
    pub fn payment_cancelled(&self, payment: &PendingPayment) -> EmailMessage {
        let body = format!(
            "<p>Hi {name},</p>\
             <p>Invoice {number} for {description} has been cancelled. No payment is due.</p>\
             <p>If you think this is a mistake, just reply to this email.</p>",
            name = escape_html(&payment.client_name),
            number = escape_html(&payment.invoice_number),
            description = escape_html(&payment.description),
        );
        EmailMessage::new(
            &payment.client_email,
            format!("Invoice {} cancelled", payment.invoice_number),
            self.layout(&body),
        )
    }

    /// Sent when an invoice passes its due date unpaid.
    pub fn payment_overdue(&self, payment: &PendingPayment) -> EmailMessage {
        let link = self
            .payment_link(payment)
            .map(|url| {
                format!(
                    r#"<p><a href="{}" style="{}">Pay now</a></p>"#,
                    escape_html(&url),
                    BUTTON_STYLE
                )
            })
            .unwrap_or_default();
        let body = format!(
            "<p>Hi {name},</p>\
             <p>Invoice <strong>{number}</strong> for {amount} was due on {due} and is now overdue.</p>\
             {link}",
            name = escape_html(&payment.client_name),
            number = escape_html(&payment.invoice_number),
            amount = format_currency(payment.total_amount),
            due = payment.due_date.long_date(),
            link = link,
        );
        EmailMessage::new(
            &payment.client_email,
            format!("Reminder: invoice {} is overdue", payment.invoice_number),
            self.layout(&body),
        )
    }

    fn layout(&self, body: &str) -> String {
        format!(
            "<!DOCTYPE html><html><body style=\"font-family: Helvetica, Arial, sans-serif; color: #1f2937;\">\
             {body}\
             <p style=\"color: #6b7280; font-size: 12px;\">{business}</p>\
             </body></html>",
            body = body,
            business = escape_html(&self.business_name),
        )
    }
}

const BUTTON_STYLE: &str =
    "display: inline-block; padding: 10px 18px; background: #2563eb; color: #ffffff; text-decoration: none; border-radius: 4px;";

/// Escapes text for use in HTML element content and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
