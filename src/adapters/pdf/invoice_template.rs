//! HTML/CSS layout for printed invoices.

use crate::application::escape_html;
use crate::domain::payment::{format_currency, InvoiceDocument};

/// Renders a self-contained HTML page for an invoice.
///
/// The page carries its own stylesheet and no external resources, so the
/// print engine never touches the network.
pub fn render_invoice_html(invoice: &InvoiceDocument, business_name: &str) -> String {
    let rows: String = invoice
        .line_items
        .iter()
        .map(|item| {
            format!(
                r#"
            <tr>
                <td>{description}</td>
                <td class="num">{quantity}</td>
                <td class="num">{unit_price}</td>
                <td class="num">{total}</td>
            </tr>"#,
                description = escape_html(&item.description),
                quantity = item.quantity,
                unit_price = format_currency(item.unit_price),
                total = format_currency(item.total()),
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Invoice {number}</title>
    <style>
{css}
    </style>
</head>
<body>
    <header>
        <h1>{business}</h1>
        <div class="meta">
            <div><span>Invoice</span> {number}</div>
            <div><span>Issued</span> {issued}</div>
            <div><span>Due</span> {due}</div>
        </div>
    </header>
    <section class="bill-to">
        <h2>Bill to</h2>
        <div>{client_name}</div>
        <div>{client_email}</div>
    </section>
    <table>
        <thead>
            <tr>
                <th>Description</th>
                <th class="num">Qty</th>
                <th class="num">Unit price</th>
                <th class="num">Amount</th>
            </tr>
        </thead>
        <tbody>{rows}
        </tbody>
        <tfoot>
            <tr>
                <td colspan="3">Total</td>
                <td class="num">{grand_total}</td>
            </tr>
        </tfoot>
    </table>
    <footer>Payment is due by {due}. Thank you for your business.</footer>
</body>
</html>"#,
        css = INVOICE_CSS,
        business = escape_html(business_name),
        number = escape_html(&invoice.invoice_number),
        issued = invoice.issued_at.long_date(),
        due = invoice.due_date.long_date(),
        client_name = escape_html(&invoice.client.name),
        client_email = escape_html(&invoice.client.email),
        rows = rows,
        grand_total = format_currency(invoice.grand_total()),
    )
}

const INVOICE_CSS: &str = r#"
        @page { size: A4; margin: 20mm; }
        body { font-family: Helvetica, Arial, sans-serif; color: #1f2937; font-size: 12px; }
        header { display: flex; justify-content: space-between; align-items: flex-start; margin-bottom: 32px; }
        h1 { font-size: 22px; margin: 0; }
        h2 { font-size: 12px; text-transform: uppercase; color: #6b7280; margin: 0 0 4px; }
        .meta span { display: inline-block; width: 60px; color: #6b7280; }
        .bill-to { margin-bottom: 24px; }
        table { width: 100%; border-collapse: collapse; }
        th { text-align: left; border-bottom: 2px solid #1f2937; padding: 6px 4px; }
        td { border-bottom: 1px solid #e5e7eb; padding: 6px 4px; }
        .num { text-align: right; }
        tfoot td { font-weight: bold; border-bottom: none; border-top: 2px solid #1f2937; }
        footer { margin-top: 32px; color: #6b7280; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::payment::{ClientIdentity, LineItem, BONUS_LINE_DESCRIPTION};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn invoice() -> InvoiceDocument {
        InvoiceDocument {
            invoice_number: "INV-1A2B3C4D".to_string(),
            client: ClientIdentity {
                name: "Dana & Co".to_string(),
                email: "dana@example.com".to_string(),
            },
            line_items: vec![
                LineItem::new("Executive coaching", 2, dec!(600)),
                LineItem::new(BONUS_LINE_DESCRIPTION, 1, dec!(25)),
            ],
            issued_at: Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            due_date: Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn includes_every_required_field() {
        let html = render_invoice_html(&invoice(), "Bright Path");

        assert!(html.contains("INV-1A2B3C4D"));
        assert!(html.contains("Dana &amp; Co"));
        assert!(html.contains("dana@example.com"));
        assert!(html.contains("Executive coaching"));
        assert!(html.contains("$1,200.00"));
        assert!(html.contains(BONUS_LINE_DESCRIPTION));
        assert!(html.contains("$25.00"));
        assert!(html.contains("$1,225.00"));
        assert!(html.contains("February 15, 2024"));
    }

    #[test]
    fn output_is_deterministic() {
        assert_eq!(
            render_invoice_html(&invoice(), "Bright Path"),
            render_invoice_html(&invoice(), "Bright Path")
        );
    }
}
