//! Notification dispatcher that keeps messages instead of sending them.
//!
//! Used by tests, and as the mail sink when no email provider is configured.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{DispatchError, EmailMessage, NotificationDispatcher};

#[derive(Default)]
struct State {
    sent: Vec<EmailMessage>,
    failures_left: u32,
}

#[derive(Default)]
pub struct CapturingDispatcher {
    state: Mutex<State>,
}

impl CapturingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.lock().sent.clone()
    }

    /// Make the next `count` sends fail with a transport error.
    pub fn fail_next_sends(&self, count: u32) {
        self.lock().failures_left = count;
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl NotificationDispatcher for CapturingDispatcher {
    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        let mut state = self.lock();
        if state.failures_left > 0 {
            state.failures_left -= 1;
            return Err(DispatchError::Transport("simulated failure".to_string()));
        }
        tracing::debug!(to = %message.to, subject = %message.subject, "Captured email");
        state.sent.push(message.clone());
        Ok(())
    }
}
