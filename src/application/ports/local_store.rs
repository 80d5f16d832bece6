use crate::domain::entities::{LocalRecord, MergeStats, RemoteSnapshotRow, StatusCount};
use crate::domain::value_objects::{LocalId, LogicalTable, RemoteId, SyncStatus};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable, table-keyed record storage. The single source of truth for
/// reads; shared between the UI writer path and both synchronizers.
///
/// Writes are durable once the call returns. `merge_remote` applies a whole
/// pull page atomically; all other operations are single-row.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(
        &self,
        table: LogicalTable,
        local_id: &LocalId,
    ) -> Result<Option<LocalRecord>, AppError>;

    /// Insert a new record. Fails if `(table, local_id)` already exists.
    async fn put(&self, record: &LocalRecord) -> Result<(), AppError>;

    /// Rewrite an existing record in place.
    async fn update(&self, record: &LocalRecord) -> Result<(), AppError>;

    async fn delete(&self, table: LogicalTable, local_id: &LocalId) -> Result<(), AppError>;

    async fn find_by_remote_id(
        &self,
        table: LogicalTable,
        remote_id: &RemoteId,
    ) -> Result<Option<LocalRecord>, AppError>;

    async fn list(&self, table: LogicalTable) -> Result<Vec<LocalRecord>, AppError>;

    /// Record the outcome of a successful push: store the remote id and
    /// flip the status to `Synced`.
    async fn mark_synced(
        &self,
        table: LogicalTable,
        local_id: &LocalId,
        remote_id: &RemoteId,
    ) -> Result<(), AppError>;

    async fn set_status(
        &self,
        table: LogicalTable,
        local_id: &LocalId,
        status: SyncStatus,
    ) -> Result<(), AppError>;

    /// Merge one pull page in a single transaction: rows matched by remote
    /// id are updated in place (preserving `local_id`), unmatched rows are
    /// inserted as `Synced` records with fresh local ids.
    async fn merge_remote(
        &self,
        table: LogicalTable,
        rows: Vec<RemoteSnapshotRow>,
    ) -> Result<MergeStats, AppError>;

    /// Record counts per sync status across all tables.
    async fn count_by_status(&self) -> Result<Vec<StatusCount>, AppError>;
}
