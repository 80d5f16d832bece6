use crate::domain::value_objects::SyncStatus;
use serde::{Deserialize, Serialize};

/// Outcome of one drain of the mutation queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushReport {
    /// Items considered in this pass.
    pub attempted: u32,
    /// Items applied remotely and removed from the queue.
    pub pushed: u32,
    /// Items removed without a remote call (record deleted before processing).
    pub discarded: u32,
    /// Items skipped because their backoff window has not elapsed.
    pub deferred: u32,
    /// Items that failed and stay queued for retry.
    pub failed: u32,
    /// Items moved to the dead-letter table.
    pub buried: u32,
    /// The pass stopped early because the session was rejected.
    pub auth_interrupted: bool,
}

/// Outcome of one per-table remote-to-local refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullReport {
    pub tables_refreshed: u32,
    pub tables_failed: u32,
    pub rows_inserted: u32,
    pub rows_updated: u32,
}

/// Row-level result of merging one pull page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub inserted: u32,
    pub updated: u32,
}

/// Result of one scheduler cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    Completed {
        push: PushReport,
        pull: PullReport,
    },
    /// Connectivity was down; nothing ran.
    Offline,
    /// Another cycle was already running; this trigger was skipped.
    AlreadyRunning,
    /// The push pass itself could not run; details were logged.
    Failed,
}

/// Record count per sync status, for the diagnostics read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: SyncStatus,
    pub count: i64,
}
