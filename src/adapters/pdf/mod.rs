//! Invoice PDF rendering.
//!
//! - `invoice_template` - HTML/CSS invoice layout
//! - `ChromePdfRenderer` - prints the layout to PDF with headless Chrome

mod headless_chrome;
mod invoice_template;

pub use headless_chrome::ChromePdfRenderer;
pub use invoice_template::render_invoice_html;
