use crate::domain::value_objects::{LocalId, LogicalTable, MutationKind, RecordPayload, RemoteId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One pending push operation. The payload is a snapshot taken at enqueue
/// time; the push pass sends the record's current payload and keeps the
/// snapshot for forensics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: i64,
    pub table: LogicalTable,
    pub kind: MutationKind,
    pub local_id: LocalId,
    pub payload: RecordPayload,
    pub remote_id: Option<RemoteId>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub next_attempt_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl QueueItem {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_attempt_at <= now
    }

    pub fn retries_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }
}

/// What the writer hands to the queue; ids and timestamps are assigned on
/// insert.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueItemDraft {
    pub table: LogicalTable,
    pub kind: MutationKind,
    pub local_id: LocalId,
    pub payload: RecordPayload,
    pub remote_id: Option<RemoteId>,
    pub max_retries: i32,
}

impl QueueItemDraft {
    pub fn new(
        table: LogicalTable,
        kind: MutationKind,
        local_id: LocalId,
        payload: RecordPayload,
        remote_id: Option<RemoteId>,
        max_retries: i32,
    ) -> Self {
        Self {
            table,
            kind,
            local_id,
            payload,
            remote_id,
            max_retries,
        }
    }
}
