use crate::domain::value_objects::{LocalId, LogicalTable, RecordPayload, RemoteId, SyncStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row in a logical table, as held by the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRecord {
    pub local_id: LocalId,
    pub remote_id: Option<RemoteId>,
    pub table: LogicalTable,
    pub payload: RecordPayload,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocalRecord {
    /// A record staged by the local writer, not yet known to the remote.
    pub fn new_pending_create(table: LogicalTable, payload: RecordPayload) -> Self {
        let now = Utc::now();
        Self {
            local_id: LocalId::generate(),
            remote_id: None,
            table,
            payload,
            sync_status: SyncStatus::PendingCreate,
            created_at: now,
            updated_at: now,
        }
    }

    /// A record materialized from a pulled remote row.
    pub fn from_remote(table: LogicalTable, remote_id: RemoteId, payload: RecordPayload) -> Self {
        let now = Utc::now();
        Self {
            local_id: LocalId::generate(),
            remote_id: Some(remote_id),
            table,
            payload,
            sync_status: SyncStatus::Synced,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_synced(&mut self, remote_id: RemoteId) {
        self.remote_id = Some(remote_id);
        self.sync_status = SyncStatus::Synced;
        self.updated_at = Utc::now();
    }

    pub fn apply_local_change(&mut self, payload: RecordPayload, status: SyncStatus) {
        self.payload = payload;
        self.sync_status = status;
        self.updated_at = Utc::now();
    }
}

/// One remote row after remote-to-local field translation, ready to merge.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSnapshotRow {
    pub remote_id: RemoteId,
    pub payload: RecordPayload,
}
