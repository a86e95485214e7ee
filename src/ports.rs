//! Storage port used by the payment use cases.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Transaction;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Transaction not found: {0}")]
    NotFound(String),

    #[error("Transaction already exists: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Internal(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Narrow store interface so a durable backend can replace the in-memory one
/// without touching the use cases.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Stores a new record. Fails with `Conflict` if the tracking id is taken.
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction>;

    async fn get_by_id(&self, tracking_id: &str) -> RepositoryResult<Transaction>;

    /// Overwrites the status of an existing record as one atomic update and
    /// returns the record as it was before the write.
    async fn update_status(&self, tracking_id: &str, status: &str)
        -> RepositoryResult<Transaction>;

    async fn count(&self) -> RepositoryResult<usize>;
}
