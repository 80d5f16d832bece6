use crate::application::ports::{LocalStore, MutationQueue, NetworkMonitor};
use crate::domain::entities::{DeadLetter, StatusCount};
use crate::domain::value_objects::LogicalTable;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Last failure observed for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFailure {
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct HealthState {
    last_errors: HashMap<String, TableFailure>,
    last_sync_at: Option<DateTime<Utc>>,
    cycles_completed: u64,
    sync_errors: u64,
}

/// Mutable health state shared by the synchronizers and the scheduler.
/// The diagnostics read model snapshots it; nothing else reads it.
#[derive(Debug, Default)]
pub struct SyncHealth {
    state: RwLock<HealthState>,
}

impl SyncHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_table_error(&self, table: LogicalTable, message: impl Into<String>) {
        let mut state = self.state.write().await;
        state.last_errors.insert(
            table.as_str().to_string(),
            TableFailure {
                message: message.into(),
                occurred_at: Utc::now(),
            },
        );
    }

    pub async fn clear_table_error(&self, table: LogicalTable) {
        self.state.write().await.last_errors.remove(table.as_str());
    }

    pub async fn mark_cycle_completed(&self) {
        let mut state = self.state.write().await;
        state.last_sync_at = Some(Utc::now());
        state.cycles_completed += 1;
    }

    pub async fn mark_cycle_failed(&self) {
        self.state.write().await.sync_errors += 1;
    }
}

/// Read-only introspection surface exposed to external consumers.
pub struct Diagnostics {
    store: Arc<dyn LocalStore>,
    queue: Arc<dyn MutationQueue>,
    network: Arc<dyn NetworkMonitor>,
    health: Arc<SyncHealth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsSnapshot {
    pub is_online: bool,
    pub queue_depth: i64,
    pub status_counts: Vec<StatusCount>,
    pub dead_letters: Vec<DeadLetter>,
    pub last_errors: HashMap<String, TableFailure>,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub cycles_completed: u64,
    pub sync_errors: u64,
}

impl Diagnostics {
    pub fn new(
        store: Arc<dyn LocalStore>,
        queue: Arc<dyn MutationQueue>,
        network: Arc<dyn NetworkMonitor>,
        health: Arc<SyncHealth>,
    ) -> Self {
        Self {
            store,
            queue,
            network,
            health,
        }
    }

    pub async fn snapshot(&self) -> Result<DiagnosticsSnapshot, AppError> {
        let queue_depth = self.queue.depth().await?;
        let status_counts = self.store.count_by_status().await?;
        let dead_letters = self.queue.dead_letters().await?;

        let state = self.health.state.read().await;
        Ok(DiagnosticsSnapshot {
            is_online: self.network.is_online(),
            queue_depth,
            status_counts,
            dead_letters,
            last_errors: state.last_errors.clone(),
            last_sync_at: state.last_sync_at,
            cycles_completed: state.cycles_completed,
            sync_errors: state.sync_errors,
        })
    }
}
