//! Notification dispatcher port - outbound email.

use async_trait::async_trait;
use thiserror::Error;

/// File attached to an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

/// A fully rendered email ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachment: Option<EmailAttachment>,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: EmailAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }
}

/// Port for sending transactional email.
///
/// Implementations report every failure through `DispatchError`; they never
/// panic or retry on their own.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The mail relay answered but refused the message.
    #[error("Email rejected by provider ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The mail relay could not be reached.
    #[error("Email transport failed: {0}")]
    Transport(String),

    /// The message itself is unusable, e.g. no recipient.
    #[error("Invalid email message: {0}")]
    InvalidMessage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_attaches_file() {
        let message = EmailMessage::new("a@example.com", "Hi", "<p>Hi</p>");
        assert!(!message.has_attachment());

        let message = message.with_attachment(EmailAttachment {
            filename: "invoice.pdf".to_string(),
            content: b"%PDF".to_vec(),
            content_type: "application/pdf".to_string(),
        });
        assert!(message.has_attachment());
    }

    #[test]
    fn rejected_error_shows_status() {
        let err = DispatchError::Rejected {
            status: 422,
            message: "invalid from".to_string(),
        };
        assert_eq!(err.to_string(), "Email rejected by provider (422): invalid from");
    }

    #[test]
    fn notification_dispatcher_is_object_safe() {
        fn _accepts_dyn(_dispatcher: &dyn NotificationDispatcher) {}
    }
}
