//! ListPendingPaymentsHandler - admin listing with an optional status filter.

use std::sync::Arc;

use crate::domain::payment::{PaymentError, PaymentStatus, PendingPayment};
use crate::ports::PendingPaymentStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPendingPaymentsQuery {
    pub status: Option<PaymentStatus>,
}

pub struct ListPendingPaymentsHandler {
    store: Arc<dyn PendingPaymentStore>,
}

impl ListPendingPaymentsHandler {
    pub fn new(store: Arc<dyn PendingPaymentStore>) -> Self {
        Self { store }
    }

    /// Records newest first.
    pub async fn handle(
        &self,
        query: ListPendingPaymentsQuery,
    ) -> Result<Vec<PendingPayment>, PaymentError> {
        self.store.list(query.status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPendingPaymentStore;
    use crate::domain::foundation::{PaymentId, Timestamp};
    use crate::domain::payment::{NewPendingPayment, StatusChange};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn filters_by_status() {
        let store = Arc::new(InMemoryPendingPaymentStore::new());
        for name in ["One", "Two"] {
            let p = PendingPayment::create(
                PaymentId::new(),
                NewPendingPayment {
                    client_email: "x@example.com".to_string(),
                    client_name: name.to_string(),
                    base_amount: dec!(10),
                    description: "Session".to_string(),
                    notes: None,
                },
                Timestamp::now(),
                14,
            )
            .unwrap();
            store.create(&p).await.unwrap();
            if name == "Two" {
                store
                    .conditional_transition(
                        &p.id,
                        &[PaymentStatus::Pending],
                        &StatusChange::status_only(PaymentStatus::Cancelled, Timestamp::now()),
                    )
                    .await
                    .unwrap();
            }
        }
        let handler = ListPendingPaymentsHandler::new(store);

        let all = handler.handle(ListPendingPaymentsQuery::default()).await.unwrap();
        let cancelled = handler
            .handle(ListPendingPaymentsQuery {
                status: Some(PaymentStatus::Cancelled),
            })
            .await
            .unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].client_name, "Two");
    }
}
