use crate::application::ports::{LocalStore, RemoteBackend};
use crate::application::services::diagnostics::SyncHealth;
use crate::domain::entities::{MergeStats, PullReport, RemoteSnapshotRow};
use crate::domain::value_objects::{LogicalTable, RecordPayload, RemoteId};
use crate::shared::error::{AppError, RemoteError};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Refreshes the local store from remote snapshots, one bounded page per
/// table. Remote deletions are not propagated; stale local rows outlive
/// their remote counterparts until the application ages them out.
pub struct PullSynchronizer {
    store: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteBackend>,
    health: Arc<SyncHealth>,
    page_size: u32,
}

impl PullSynchronizer {
    pub fn new(
        store: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteBackend>,
        health: Arc<SyncHealth>,
        page_size: u32,
    ) -> Self {
        Self {
            store,
            remote,
            health,
            page_size,
        }
    }

    /// Refresh every managed table. Per-table failures are logged and
    /// recorded; they never abort the pass.
    pub async fn run_pass(&self) -> PullReport {
        let mut report = PullReport::default();
        for table in LogicalTable::ALL {
            match self.refresh_table(table).await {
                Ok(stats) => {
                    report.tables_refreshed += 1;
                    report.rows_inserted += stats.inserted;
                    report.rows_updated += stats.updated;
                    self.health.clear_table_error(table).await;
                    debug!(
                        "pulled {}: {} inserted, {} updated",
                        table, stats.inserted, stats.updated
                    );
                }
                Err(err) => {
                    report.tables_failed += 1;
                    warn!("pull of {} failed: {}", table, err);
                    self.health.record_table_error(table, err.to_string()).await;
                }
            }
        }
        report
    }

    /// Fetch one page for `table` and merge it in a single transaction.
    async fn refresh_table(&self, table: LogicalTable) -> Result<MergeStats, AppError> {
        let rows = self
            .remote
            .select(table.remote_table(), self.page_size)
            .await?;

        let mut snapshot = Vec::with_capacity(rows.len());
        for row in rows {
            snapshot.push(parse_remote_row(table, row)?);
        }
        self.store.merge_remote(table, snapshot).await
    }
}

/// Split a remote row into its key and a payload translated into the local
/// vocabulary.
fn parse_remote_row(table: LogicalTable, row: Value) -> Result<RemoteSnapshotRow, AppError> {
    let Value::Object(mut map) = row else {
        return Err(RemoteError::Schema(format!("{table}: remote row is not an object")).into());
    };
    let remote_id = match map.remove("id") {
        Some(Value::String(s)) => RemoteId::new(s).map_err(AppError::InvalidInput)?,
        Some(Value::Number(n)) => RemoteId::new(n.to_string()).map_err(AppError::InvalidInput)?,
        _ => {
            return Err(RemoteError::Schema(format!("{table}: remote row carries no id")).into());
        }
    };
    let payload = RecordPayload::new(Value::Object(table.to_local_row(map)))
        .map_err(AppError::InvalidInput)?;
    Ok(RemoteSnapshotRow { remote_id, payload })
}
