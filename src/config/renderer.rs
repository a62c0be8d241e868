//! PDF renderer configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Headless Chrome settings for invoice PDFs
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    /// Chrome/Chromium executable, resolved via PATH when not absolute
    #[serde(default = "default_chrome_path")]
    pub chrome_path: String,

    /// Per-render timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RendererConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.chrome_path.trim().is_empty() {
            return Err(ValidationError::MissingRequired("RENDERER__CHROME_PATH"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidRendererTimeout);
        }
        Ok(())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            chrome_path: default_chrome_path(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chrome_path() -> String {
    "chromium".to_string()
}

fn default_timeout() -> u64 {
    30
}
