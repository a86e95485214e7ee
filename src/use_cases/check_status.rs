//! Poll use case: pure read of the stored status.

use std::sync::Arc;

use super::PaymentError;
use crate::ports::TransactionRepository;

pub struct CheckStatus {
    transaction_repository: Arc<dyn TransactionRepository>,
}

impl CheckStatus {
    pub fn new(transaction_repository: Arc<dyn TransactionRepository>) -> Self {
        Self {
            transaction_repository,
        }
    }

    /// Returns the stored status verbatim.
    pub async fn execute(&self, tracking_id: &str) -> Result<String, PaymentError> {
        let tx = self.transaction_repository.get_by_id(tracking_id).await?;
        tracing::debug!(tracking_id = %tracking_id, status = %tx.status, "Status polled");
        Ok(tx.status)
    }
}
