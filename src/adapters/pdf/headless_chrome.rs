//! Headless Chrome invoice renderer.
//!
//! Writes the invoice HTML to a scratch directory and runs the browser's
//! `--print-to-pdf` mode against it. Chrome or Chromium must be installed;
//! the binary path is configurable.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::payment::InvoiceDocument;
use crate::ports::{InvoiceRenderer, RenderError};

use super::invoice_template::render_invoice_html;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Invoice renderer backed by a headless Chrome process.
#[derive(Debug, Clone)]
pub struct ChromePdfRenderer {
    chrome_path: String,
    timeout_secs: u64,
    business_name: String,
}

impl ChromePdfRenderer {
    pub fn new(chrome_path: impl Into<String>, business_name: impl Into<String>) -> Self {
        Self {
            chrome_path: chrome_path.into(),
            timeout_secs: 30,
            business_name: business_name.into(),
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn print_args(html_path: &Path, pdf_path: &Path) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--no-pdf-header-footer".to_string(),
            format!("--print-to-pdf={}", pdf_path.display()),
            format!("file://{}", html_path.display()),
        ]
    }
}

#[async_trait]
impl InvoiceRenderer for ChromePdfRenderer {
    async fn render(&self, invoice: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
        let html = render_invoice_html(invoice, &self.business_name);

        let scratch = tempfile::tempdir()
            .map_err(|e| RenderError::content_injection(format!("No scratch directory: {}", e)))?;
        let html_path = scratch.path().join("invoice.html");
        let pdf_path = scratch.path().join("invoice.pdf");

        tokio::fs::write(&html_path, html.as_bytes())
            .await
            .map_err(|e| RenderError::content_injection(format!("Failed to write HTML: {}", e)))?;

        let child = Command::new(&self.chrome_path)
            .args(Self::print_args(&html_path, &pdf_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RenderError::engine_startup(format!("Failed to start {}: {}", self.chrome_path, e))
            })?;

        let output = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| RenderError::Timeout(self.timeout_secs))?
        .map_err(|e| RenderError::render_to_bytes(format!("Browser process failed: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::render_to_bytes(format!(
                "Browser exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let bytes = tokio::fs::read(&pdf_path)
            .await
            .map_err(|e| RenderError::render_to_bytes(format!("No PDF produced: {}", e)))?;

        if !bytes.starts_with(PDF_MAGIC) {
            return Err(RenderError::render_to_bytes("Output is not a PDF"));
        }

        tracing::debug!(
            invoice_number = %invoice.invoice_number,
            size = bytes.len(),
            "Invoice rendered"
        );
        Ok(bytes)
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.chrome_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}
