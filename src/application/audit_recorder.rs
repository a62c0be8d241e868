//! AuditRecorder - best-effort writes to the audit log.
//!
//! Transient store failures are retried with truncating exponential backoff.
//! Once attempts run out, or on a permanent failure, the entry is dropped and
//! logged. Nothing is ever returned as an error: the transition being audited
//! has already committed.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::payment::AuditEntry;
use crate::ports::AuditLog;

/// Bounded retry with truncating exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Retries without sleeping. Used in tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    /// Delay before the attempt following `attempt` (1-based):
    /// `base * 2^(attempt-1)`, capped at `max_delay`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100), Duration::from_secs(2))
    }
}

/// What happened to an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Recorded { attempts: u32 },
    Dropped { attempts: u32 },
}

impl AuditOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, AuditOutcome::Recorded { .. })
    }
}

/// Writes audit entries, retrying transient failures.
#[derive(Clone)]
pub struct AuditRecorder {
    log: Arc<dyn AuditLog>,
    policy: RetryPolicy,
}

impl AuditRecorder {
    pub fn new(log: Arc<dyn AuditLog>, policy: RetryPolicy) -> Self {
        Self { log, policy }
    }

    pub async fn record(&self, entry: &AuditEntry) -> AuditOutcome {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.log.append(entry).await {
                Ok(()) => {
                    tracing::debug!(
                        payment_id = %entry.entity_id,
                        from = %entry.previous_status,
                        to = %entry.new_status,
                        attempt,
                        "Audit entry recorded"
                    );
                    return AuditOutcome::Recorded { attempts: attempt };
                }
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        payment_id = %entry.entity_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Audit write failed, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        payment_id = %entry.entity_id,
                        from = %entry.previous_status,
                        to = %entry.new_status,
                        amount = %entry.amount,
                        actor = %entry.actor,
                        attempt,
                        error = %e,
                        "Audit entry dropped"
                    );
                    return AuditOutcome::Dropped { attempts: attempt };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{PaymentId, Timestamp};
    use crate::domain::payment::{Actor, NewPendingPayment, PaymentStatus, PendingPayment};
    use crate::ports::AuditStoreError;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    /// Fails with the scripted errors first, then succeeds.
    struct ScriptedAuditLog {
        failures: Mutex<VecDeque<AuditStoreError>>,
        calls: Mutex<u32>,
        entries: Mutex<Vec<AuditEntry>>,
    }

    impl ScriptedAuditLog {
        fn failing_with(failures: Vec<AuditStoreError>) -> Self {
            Self {
                failures: Mutex::new(failures.into()),
                calls: Mutex::new(0),
                entries: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }

        fn stored(&self) -> usize {
            self.entries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AuditLog for ScriptedAuditLog {
        async fn append(&self, entry: &AuditEntry) -> Result<(), AuditStoreError> {
            *self.calls.lock().unwrap() += 1;
            if let Some(err) = self.failures.lock().unwrap().pop_front() {
                return Err(err);
            }
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn list_for_entity(
            &self,
            entity_id: &PaymentId,
        ) -> Result<Vec<AuditEntry>, AuditStoreError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| &e.entity_id == entity_id)
                .cloned()
                .collect())
        }
    }

    fn entry() -> AuditEntry {
        let payment = PendingPayment::create(
            PaymentId::new(),
            NewPendingPayment {
                client_email: "kim@example.com".to_string(),
                client_name: "Kim".to_string(),
                base_amount: dec!(80),
                description: "Session".to_string(),
                notes: None,
            },
            Timestamp::now(),
            14,
        )
        .unwrap();
        AuditEntry::for_transition(PaymentStatus::Pending, &payment, Actor::admin("ops"))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // RetryPolicy
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn backoff_doubles_then_truncates() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(350));
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(350));
        assert_eq!(policy.delay_after(40), Duration::from_millis(350));
    }

    #[test]
    fn at_least_one_attempt() {
        assert_eq!(RetryPolicy::immediate(0).max_attempts, 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // AuditRecorder
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn records_on_first_attempt() {
        let log = Arc::new(ScriptedAuditLog::failing_with(vec![]));
        let recorder = AuditRecorder::new(log.clone(), RetryPolicy::immediate(3));

        let outcome = recorder.record(&entry()).await;

        assert_eq!(outcome, AuditOutcome::Recorded { attempts: 1 });
        assert_eq!(log.stored(), 1);
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let log = Arc::new(ScriptedAuditLog::failing_with(vec![
            AuditStoreError::transient("reset"),
            AuditStoreError::transient("timeout"),
        ]));
        let recorder = AuditRecorder::new(log.clone(), RetryPolicy::immediate(3));

        let outcome = recorder.record(&entry()).await;

        assert_eq!(outcome, AuditOutcome::Recorded { attempts: 3 });
        assert_eq!(log.stored(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let log = Arc::new(ScriptedAuditLog::failing_with(vec![
            AuditStoreError::transient("down"),
            AuditStoreError::transient("down"),
            AuditStoreError::transient("down"),
            AuditStoreError::transient("down"),
        ]));
        let recorder = AuditRecorder::new(log.clone(), RetryPolicy::immediate(3));

        let outcome = recorder.record(&entry()).await;

        assert_eq!(outcome, AuditOutcome::Dropped { attempts: 3 });
        assert_eq!(log.calls(), 3);
        assert_eq!(log.stored(), 0);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let log = Arc::new(ScriptedAuditLog::failing_with(vec![AuditStoreError::permanent(
            "constraint",
        )]));
        let recorder = AuditRecorder::new(log.clone(), RetryPolicy::immediate(3));

        let outcome = recorder.record(&entry()).await;

        assert_eq!(outcome, AuditOutcome::Dropped { attempts: 1 });
        assert_eq!(log.calls(), 1);
    }

    #[tokio::test]
    async fn sleeps_between_attempts() {
        let log = Arc::new(ScriptedAuditLog::failing_with(vec![AuditStoreError::transient(
            "blip",
        )]));
        let policy = RetryPolicy::new(2, Duration::from_millis(5), Duration::from_millis(5));
        let recorder = AuditRecorder::new(log, policy);

        let started = std::time::Instant::now();
        let outcome = recorder.record(&entry()).await;

        assert!(outcome.is_recorded());
        assert!(started.elapsed() >= Duration::from_millis(5));
    }
}
