use crate::domain::value_objects::{LocalId, LogicalTable, MutationKind, RecordPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mutation permanently abandoned after exhausting its retry budget (or
/// failing with a non-retryable error). Kept for diagnostics instead of
/// being dropped silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub id: i64,
    pub table: LogicalTable,
    pub kind: MutationKind,
    pub local_id: LocalId,
    pub payload: RecordPayload,
    pub retry_count: i32,
    pub reason: String,
    pub buried_at: DateTime<Utc>,
}
