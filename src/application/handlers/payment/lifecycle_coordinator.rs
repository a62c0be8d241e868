//! PaymentLifecycleCoordinator - every status transition after creation.
//!
//! Two entry points share one write path:
//!
//! - [`PaymentLifecycleCoordinator::complete_from_provider`] for provider
//!   callbacks. Guarded by `pending|overdue`; re-deliveries, late events and
//!   lost races are no-op successes.
//! - [`PaymentLifecycleCoordinator::apply_admin_transition`] for manual
//!   changes. Illegal moves and lost races are reported to the caller.
//!
//! Both write through the store's conditional transition, then hand the
//! committed record to the side-effect pipeline.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::side_effects::SideEffectPipeline;
use crate::domain::foundation::{PaymentId, Timestamp};
use crate::domain::payment::{Actor, PaymentError, PaymentStatus, PendingPayment};
use crate::ports::{CompletionEvent, PendingPaymentStore};

/// Command to complete a payment from a provider event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteFromProviderCommand {
    pub record_id: PaymentId,
    pub charged_amount: Decimal,
    pub session_id: String,
}

impl From<CompletionEvent> for CompleteFromProviderCommand {
    fn from(event: CompletionEvent) -> Self {
        Self {
            record_id: event.record_id,
            charged_amount: event.charged_amount,
            session_id: event.session_id,
        }
    }
}

/// Result of a provider completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// This call moved the record to `Completed`.
    Completed(PendingPayment),
    /// The record was already completed; nothing changed.
    AlreadyCompleted(PendingPayment),
    /// The record is in a status that cannot be paid; nothing changed.
    Ignored { status: PaymentStatus },
}

impl CompletionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CompletionOutcome::Completed(_) => "completed",
            CompletionOutcome::AlreadyCompleted(_) => "already_completed",
            CompletionOutcome::Ignored { .. } => "ignored",
        }
    }
}

/// Command for a manual status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminTransitionCommand {
    pub record_id: PaymentId,
    pub target: PaymentStatus,
    pub admin_id: String,
}

/// Coordinator for pending-payment transitions.
#[derive(Clone)]
pub struct PaymentLifecycleCoordinator {
    store: Arc<dyn PendingPaymentStore>,
    side_effects: SideEffectPipeline,
}

impl PaymentLifecycleCoordinator {
    pub fn new(store: Arc<dyn PendingPaymentStore>, side_effects: SideEffectPipeline) -> Self {
        Self {
            store,
            side_effects,
        }
    }

    pub async fn complete_from_provider(
        &self,
        cmd: CompleteFromProviderCommand,
    ) -> Result<CompletionOutcome, PaymentError> {
        let current = self.store.get_by_id(&cmd.record_id).await?;

        if current.status == PaymentStatus::Completed {
            tracing::info!(
                payment_id = %current.id,
                session_id = %cmd.session_id,
                "Completion event for already completed payment, ignoring"
            );
            return Ok(CompletionOutcome::AlreadyCompleted(current));
        }
        if !current.status.is_payable() {
            tracing::warn!(
                payment_id = %current.id,
                status = %current.status,
                session_id = %cmd.session_id,
                "Completion event for unpayable payment, ignoring"
            );
            return Ok(CompletionOutcome::Ignored {
                status: current.status,
            });
        }

        let change =
            current.completion_change(cmd.charged_amount, &cmd.session_id, Timestamp::now())?;
        if cmd.charged_amount < current.base_amount {
            tracing::warn!(
                payment_id = %current.id,
                base_amount = %current.base_amount,
                charged_amount = %cmd.charged_amount,
                "Charged amount below base amount, recording base as total"
            );
        }

        match self
            .store
            .conditional_transition(&current.id, &PaymentStatus::PAYABLE, &change)
            .await
        {
            Ok(updated) => {
                tracing::info!(
                    payment_id = %updated.id,
                    from = %current.status,
                    total_amount = %updated.total_amount,
                    bonus_amount = %updated.bonus_amount,
                    "Payment completed by provider"
                );
                self.side_effects
                    .after_transition(current.status, updated.clone(), Actor::System)
                    .await;
                Ok(CompletionOutcome::Completed(updated))
            }
            Err(PaymentError::Conflict { actual, .. }) => {
                tracing::info!(
                    payment_id = %current.id,
                    actual = %actual,
                    "Lost transition race during provider completion"
                );
                if actual == PaymentStatus::Completed {
                    let winner = self.store.get_by_id(&current.id).await?;
                    return Ok(CompletionOutcome::AlreadyCompleted(winner));
                }
                Ok(CompletionOutcome::Ignored { status: actual })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn apply_admin_transition(
        &self,
        cmd: AdminTransitionCommand,
    ) -> Result<PendingPayment, PaymentError> {
        let current = self.store.get_by_id(&cmd.record_id).await?;
        let change = current.manual_change(cmd.target, Timestamp::now())?;

        let updated = self
            .store
            .conditional_transition(&current.id, &[current.status], &change)
            .await
            .map_err(|e| {
                if let PaymentError::Conflict { actual, .. } = &e {
                    tracing::info!(
                        payment_id = %current.id,
                        expected = %current.status,
                        actual = %actual,
                        admin_id = %cmd.admin_id,
                        "Lost transition race during admin change"
                    );
                }
                e
            })?;

        tracing::info!(
            payment_id = %updated.id,
            from = %current.status,
            to = %updated.status,
            admin_id = %cmd.admin_id,
            "Payment status changed by admin"
        );
        self.side_effects
            .after_transition(current.status, updated.clone(), Actor::admin(cmd.admin_id))
            .await;
        Ok(updated)
    }
}
