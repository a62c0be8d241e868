//! Invoice document model.
//!
//! Structured data handed to the invoice renderer. Totals and formatting live
//! here so every renderer prints the same numbers.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::PendingPayment;

/// Description used for the synthetic line added when a client pays extra.
pub const BONUS_LINE_DESCRIPTION: &str = "Bonus contribution";

/// Who the invoice is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentity {
    pub name: String,
    pub email: String,
}

/// One billable line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// `quantity × unit_price`.
    pub fn total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Everything printed on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub client: ClientIdentity,
    pub line_items: Vec<LineItem>,
    pub issued_at: Timestamp,
    pub due_date: Timestamp,
}

impl InvoiceDocument {
    /// Invoice as issued: a single service line for the base amount.
    pub fn issued(payment: &PendingPayment) -> Self {
        Self {
            invoice_number: payment.invoice_number.clone(),
            client: ClientIdentity {
                name: payment.client_name.clone(),
                email: payment.client_email.clone(),
            },
            line_items: vec![LineItem::new(
                payment.description.clone(),
                1,
                payment.base_amount,
            )],
            issued_at: payment.created_at,
            due_date: payment.due_date,
        }
    }

    /// Invoice for a completed payment: the service line plus a bonus line
    /// when the client paid more than the base amount.
    pub fn paid(payment: &PendingPayment) -> Self {
        let mut document = Self::issued(payment);
        if payment.bonus_amount > Decimal::ZERO {
            document
                .line_items
                .push(LineItem::new(BONUS_LINE_DESCRIPTION, 1, payment.bonus_amount));
        }
        document
    }

    pub fn grand_total(&self) -> Decimal {
        self.line_items.iter().map(LineItem::total).sum()
    }

    /// Attachment filename, e.g. `invoice-INV-1A2B3C4D.pdf`.
    pub fn pdf_filename(&self) -> String {
        format!("invoice-{}.pdf", self.invoice_number)
    }
}

/// Two-decimal currency string with thousands separators, e.g. `$1,250.00`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (whole, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{}", if negative { "-" } else { "" }, grouped, cents)
}
