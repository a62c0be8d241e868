//! Invoice Renderer Port - turns invoice data into a PDF.
//!
//! The domain hands over an [`InvoiceDocument`]; adapters (like
//! `ChromePdfRenderer`) lay it out as HTML and print it to PDF bytes.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::payment::InvoiceDocument;

/// MIME type of rendered invoices.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Port for rendering invoices.
///
/// # Contract
///
/// The PDF must show the invoice number, client name and email, every line
/// item with its total, the grand total and the long-form due date.
/// Rendering is stateless; the same document always yields the same content.
#[async_trait]
pub trait InvoiceRenderer: Send + Sync {
    /// Render the invoice to PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if any stage of rendering fails. Callers treat
    /// every variant the same way: proceed without a PDF.
    async fn render(&self, invoice: &InvoiceDocument) -> Result<Vec<u8>, RenderError>;

    /// Check if the rendering engine can be started.
    async fn is_available(&self) -> bool;
}

/// Errors that can occur while rendering an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The rendering engine could not be launched.
    #[error("Rendering engine failed to start: {0}")]
    EngineStartup(String),

    /// The invoice markup could not be handed to the engine.
    #[error("Failed to load invoice content: {0}")]
    ContentInjection(String),

    /// The engine ran but produced no usable PDF.
    #[error("Failed to render PDF: {0}")]
    RenderToBytes(String),

    #[error("Rendering timed out after {0} seconds")]
    Timeout(u64),
}

impl RenderError {
    pub fn engine_startup(reason: impl Into<String>) -> Self {
        Self::EngineStartup(reason.into())
    }

    pub fn content_injection(reason: impl Into<String>) -> Self {
        Self::ContentInjection(reason.into())
    }

    pub fn render_to_bytes(reason: impl Into<String>) -> Self {
        Self::RenderToBytes(reason.into())
    }
}
