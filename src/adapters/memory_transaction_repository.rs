//! In-memory implementation of TransactionRepository.
//! Records live for the lifetime of the process only.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::Transaction;
use crate::ports::{RepositoryError, RepositoryResult, TransactionRepository};

/// All access is serialised through a single lock; every mutation happens
/// under the write guard.
#[derive(Clone, Default)]
pub struct InMemoryTransactionRepository {
    transactions: Arc<RwLock<HashMap<String, Transaction>>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let mut transactions = self.transactions.write().await;
        if transactions.contains_key(&tx.tracking_id) {
            return Err(RepositoryError::Conflict(tx.tracking_id.clone()));
        }
        transactions.insert(tx.tracking_id.clone(), tx.clone());
        Ok(tx.clone())
    }

    async fn get_by_id(&self, tracking_id: &str) -> RepositoryResult<Transaction> {
        self.transactions
            .read()
            .await
            .get(tracking_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(tracking_id.to_string()))
    }

    async fn update_status(
        &self,
        tracking_id: &str,
        status: &str,
    ) -> RepositoryResult<Transaction> {
        let mut transactions = self.transactions.write().await;
        let tx = transactions
            .get_mut(tracking_id)
            .ok_or_else(|| RepositoryError::NotFound(tracking_id.to_string()))?;

        let previous = tx.clone();
        tx.status = status.to_string();
        tx.updated_at = Utc::now();
        Ok(previous)
    }

    async fn count(&self) -> RepositoryResult<usize> {
        Ok(self.transactions.read().await.len())
    }
}
