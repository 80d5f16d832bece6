use crate::domain::entities::{DeadLetter, QueueItem, QueueItemDraft};
use crate::domain::value_objects::LogicalTable;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable queue of pending push operations, independent of current record
/// content. Mutated only by the engine; the UI layer never touches it.
#[async_trait]
pub trait MutationQueue: Send + Sync {
    async fn enqueue(&self, draft: QueueItemDraft) -> Result<i64, AppError>;

    /// All queued items in insertion order.
    async fn list(&self) -> Result<Vec<QueueItem>, AppError>;

    async fn list_for_table(&self, table: LogicalTable) -> Result<Vec<QueueItem>, AppError>;

    async fn remove(&self, id: i64) -> Result<(), AppError>;

    /// Increment the retry counter and arm the backoff gate after a failed
    /// attempt.
    async fn record_failure(
        &self,
        id: i64,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Move an item to the dead-letter table. Atomic: the item is gone from
    /// the queue exactly when the dead letter exists.
    async fn bury(&self, item: &QueueItem, reason: &str) -> Result<(), AppError>;

    async fn depth(&self) -> Result<i64, AppError>;

    async fn dead_letters(&self) -> Result<Vec<DeadLetter>, AppError>;
}
