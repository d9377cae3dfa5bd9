//! Persistence and audit seams consumed by the workflow.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

/// Conditional status update. The stored status must still equal `expected`
/// when the update runs, otherwise the repository reports a conflict.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub expected: TransactionStatus,
    pub new: TransactionStatus,
    pub notes: Option<String>,
    pub submission_ref: Option<String>,
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction>;

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction>;

    async fn list_by_customer(
        &self,
        customer_id: Uuid,
        status: Option<TransactionStatus>,
        page: Page,
    ) -> RepositoryResult<(Vec<Transaction>, i64)>;

    async fn list_by_status(
        &self,
        status: TransactionStatus,
        page: Page,
    ) -> RepositoryResult<(Vec<Transaction>, i64)>;

    /// Compare-and-swap status update. Returns the updated transaction, or
    /// `Conflict` when another actor changed the status first.
    async fn update_status(&self, id: Uuid, change: StatusChange) -> RepositoryResult<Transaction>;
}

/// Post-commit audit hook. Implementations persist the entry on a best-effort
/// basis; failures are logged and swallowed, never surfaced to the caller.
#[async_trait]
pub trait AuditRecorder: Send + Sync {
    async fn record(
        &self,
        actor_id: Uuid,
        action: &str,
        transaction_id: Option<Uuid>,
        detail: serde_json::Value,
    );
}
