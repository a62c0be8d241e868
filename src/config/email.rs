//! Email configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Email configuration (Resend)
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key. Empty outside production means mail is only logged.
    #[serde(default)]
    pub resend_api_key: String,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Resend API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl EmailConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    pub fn is_configured(&self) -> bool {
        !self.resend_api_key.is_empty()
    }

    /// Validate email configuration. A key is mandatory in production.
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.resend_api_key.is_empty() {
            if environment == Environment::Production {
                return Err(ValidationError::MissingRequired("EMAIL__RESEND_API_KEY"));
            }
        } else if !self.resend_api_key.starts_with("re_") {
            return Err(ValidationError::InvalidResendKey);
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_from_email() -> String {
    "billing@example.com".to_string()
}

fn default_from_name() -> String {
    "Coaching Billing".to_string()
}

fn default_api_base_url() -> String {
    "https://api.resend.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_config_defaults() {
        let config = EmailConfig::default();
        assert_eq!(config.api_base_url, "https://api.resend.com");
        assert!(!config.is_configured());
    }

    #[test]
    fn test_from_header() {
        let config = EmailConfig {
            from_email: "coach@example.com".to_string(),
            from_name: "Ana Coaching".to_string(),
            ..Default::default()
        };
        assert_eq!(config.from_header(), "Ana Coaching <coach@example.com>");
    }

    #[test]
    fn test_missing_key_allowed_outside_production() {
        let config = EmailConfig::default();
        assert!(config.validate(Environment::Development).is_ok());
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::MissingRequired("EMAIL__RESEND_API_KEY"))
        );
    }

    #[test]
    fn test_validation_invalid_api_key_prefix() {
        let config = EmailConfig {
            resend_api_key: "sk_xxx".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::InvalidResendKey)
        );
    }

    #[test]
    fn test_validation_invalid_from_email() {
        let config = EmailConfig {
            resend_api_key: "re_xxx".to_string(),
            from_email: "invalid-email".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::InvalidFromEmail)
        );
    }
}
