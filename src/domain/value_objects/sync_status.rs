use crate::domain::value_objects::mutation::MutationKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-record synchronization state. Every record carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Synced,
    PendingCreate,
    PendingUpdate,
    PendingDelete,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Synced => "synced",
            SyncStatus::PendingCreate => "pending_create",
            SyncStatus::PendingUpdate => "pending_update",
            SyncStatus::PendingDelete => "pending_delete",
            SyncStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "synced" => Ok(SyncStatus::Synced),
            "pending_create" => Ok(SyncStatus::PendingCreate),
            "pending_update" => Ok(SyncStatus::PendingUpdate),
            "pending_delete" => Ok(SyncStatus::PendingDelete),
            "error" => Ok(SyncStatus::Error),
            other => Err(format!("Unknown sync status: {other}")),
        }
    }

    pub const ALL: [SyncStatus; 5] = [
        SyncStatus::Synced,
        SyncStatus::PendingCreate,
        SyncStatus::PendingUpdate,
        SyncStatus::PendingDelete,
        SyncStatus::Error,
    ];
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<MutationKind> for SyncStatus {
    fn from(kind: MutationKind) -> Self {
        match kind {
            MutationKind::Create => SyncStatus::PendingCreate,
            MutationKind::Update => SyncStatus::PendingUpdate,
            MutationKind::Delete => SyncStatus::PendingDelete,
        }
    }
}
