pub mod memory;

use async_trait::async_trait;

use crate::services::checker::CheckResult;

pub use memory::MemoryResultStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Durable home for check results
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn save(&self, result: &CheckResult) -> Result<(), StorageError>;

    /// All-or-nothing: either every result is stored or none is.
    async fn save_batch(&self, results: &[CheckResult]) -> Result<(), StorageError>;

    /// Most recent first.
    async fn query_recent(&self, url: &str, limit: u32) -> Result<Vec<CheckResult>, StorageError>;
}
