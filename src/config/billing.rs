//! Billing behaviour configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Business details and invoice behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Shown on invoices and in email copy
    #[serde(default = "default_business_name")]
    pub business_name: String,

    /// Days between invoice creation and due date
    #[serde(default = "default_payment_terms_days")]
    pub payment_terms_days: u32,

    /// Public checkout page; invoice emails link to `{url}?payment={id}`
    #[serde(default)]
    pub payment_page_url: Option<String>,

    /// Attach the rendered PDF to the invoice-issued email
    #[serde(default)]
    pub attach_pdf_to_issued_invoice: bool,

    /// Run rendering, email and audit off the request path
    #[serde(default = "default_detached_side_effects")]
    pub detached_side_effects: bool,
}

impl BillingConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.business_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("BILLING__BUSINESS_NAME"));
        }
        if self.payment_terms_days == 0 || self.payment_terms_days > 365 {
            return Err(ValidationError::InvalidPaymentTerms);
        }
        if let Some(url) = &self.payment_page_url {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ValidationError::InvalidPaymentPageUrl);
            }
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            business_name: default_business_name(),
            payment_terms_days: default_payment_terms_days(),
            payment_page_url: None,
            attach_pdf_to_issued_invoice: false,
            detached_side_effects: default_detached_side_effects(),
        }
    }
}

fn default_business_name() -> String {
    "Coaching".to_string()
}

fn default_payment_terms_days() -> u32 {
    14
}

fn default_detached_side_effects() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BillingConfig::default();
        assert_eq!(config.payment_terms_days, 14);
        assert!(config.detached_side_effects);
        assert!(!config.attach_pdf_to_issued_invoice);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_terms() {
        let config = BillingConfig {
            payment_terms_days: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPaymentTerms));
    }

    #[test]
    fn test_payment_page_url_must_be_http() {
        let config = BillingConfig {
            payment_page_url: Some("ftp://pay.example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPaymentPageUrl));
    }
}
