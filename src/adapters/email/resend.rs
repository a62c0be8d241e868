//! Resend implementation of NotificationDispatcher.
//!
//! Sends through the Resend HTTP API. Attachments are base64-encoded into
//! the JSON body.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::ports::{DispatchError, EmailMessage, NotificationDispatcher};

/// Configuration for the Resend dispatcher.
#[derive(Debug, Clone)]
pub struct ResendConfig {
    api_key: SecretString,
    /// `Name <address>` used as the sender.
    pub from: String,
    /// API base URL (default: https://api.resend.com).
    pub base_url: String,
    pub timeout: Duration,
}

impl ResendConfig {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            from: from.into(),
            base_url: "https://api.resend.com".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<ResendAttachment<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
struct ResendAttachment<'a> {
    filename: &'a str,
    content: String,
    content_type: &'a str,
}

/// Email dispatcher backed by Resend.
pub struct ResendDispatcher {
    config: ResendConfig,
    client: Client,
}

impl ResendDispatcher {
    pub fn new(config: ResendConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, client }
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.config.base_url)
    }

    fn build_request<'a>(&'a self, message: &'a EmailMessage) -> SendEmailRequest<'a> {
        SendEmailRequest {
            from: &self.config.from,
            to: vec![message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
            attachments: message
                .attachment
                .iter()
                .map(|a| ResendAttachment {
                    filename: &a.filename,
                    content: STANDARD.encode(&a.content),
                    content_type: &a.content_type,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl NotificationDispatcher for ResendDispatcher {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        if message.to.trim().is_empty() {
            return Err(DispatchError::InvalidMessage("recipient is empty".to_string()));
        }

        let response = self
            .client
            .post(self.emails_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&self.build_request(message))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DispatchError::Transport(format!("Request timed out: {}", e))
                } else {
                    DispatchError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DispatchError::Rejected {
            status: status.as_u16(),
            message: body,
        })
    }
}
