use crate::domain::entities::{DeadLetter, LocalRecord, QueueItem};
use crate::domain::value_objects::{
    LocalId, LogicalTable, MutationKind, RecordPayload, RemoteId, SyncStatus,
};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub(crate) fn timestamp(secs: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AppError::Database(format!("timestamp out of range: {secs}")))
}

#[derive(Debug, FromRow)]
pub(crate) struct RecordRow {
    pub table_name: String,
    pub local_id: String,
    pub remote_id: Option<String>,
    pub payload: String,
    pub sync_status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<RecordRow> for LocalRecord {
    type Error = AppError;

    fn try_from(row: RecordRow) -> Result<Self, AppError> {
        let remote_id = row
            .remote_id
            .map(RemoteId::new)
            .transpose()
            .map_err(AppError::Database)?;
        Ok(LocalRecord {
            local_id: LocalId::new(row.local_id).map_err(AppError::Database)?,
            remote_id,
            table: LogicalTable::parse(&row.table_name).map_err(AppError::Database)?,
            payload: RecordPayload::from_json_str(&row.payload).map_err(AppError::Database)?,
            sync_status: SyncStatus::parse(&row.sync_status).map_err(AppError::Database)?,
            created_at: timestamp(row.created_at)?,
            updated_at: timestamp(row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct QueueRow {
    pub id: i64,
    pub table_name: String,
    pub operation: String,
    pub local_id: String,
    pub payload: String,
    pub remote_id: Option<String>,
    pub retry_count: i64,
    pub max_retries: i64,
    pub next_attempt_at: i64,
    pub last_error: Option<String>,
    pub created_at: i64,
}

impl TryFrom<QueueRow> for QueueItem {
    type Error = AppError;

    fn try_from(row: QueueRow) -> Result<Self, AppError> {
        let remote_id = row
            .remote_id
            .map(RemoteId::new)
            .transpose()
            .map_err(AppError::Database)?;
        Ok(QueueItem {
            id: row.id,
            table: LogicalTable::parse(&row.table_name).map_err(AppError::Database)?,
            kind: MutationKind::parse(&row.operation).map_err(AppError::Database)?,
            local_id: LocalId::new(row.local_id).map_err(AppError::Database)?,
            payload: RecordPayload::from_json_str(&row.payload).map_err(AppError::Database)?,
            remote_id,
            retry_count: row.retry_count as i32,
            max_retries: row.max_retries as i32,
            next_attempt_at: timestamp(row.next_attempt_at)?,
            last_error: row.last_error,
            created_at: timestamp(row.created_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct DeadLetterRow {
    pub id: i64,
    pub table_name: String,
    pub operation: String,
    pub local_id: String,
    pub payload: String,
    pub retry_count: i64,
    pub reason: String,
    pub buried_at: i64,
}

impl TryFrom<DeadLetterRow> for DeadLetter {
    type Error = AppError;

    fn try_from(row: DeadLetterRow) -> Result<Self, AppError> {
        Ok(DeadLetter {
            id: row.id,
            table: LogicalTable::parse(&row.table_name).map_err(AppError::Database)?,
            kind: MutationKind::parse(&row.operation).map_err(AppError::Database)?,
            local_id: LocalId::new(row.local_id).map_err(AppError::Database)?,
            payload: RecordPayload::from_json_str(&row.payload).map_err(AppError::Database)?,
            retry_count: row.retry_count as i32,
            reason: row.reason,
            buried_at: timestamp(row.buried_at)?,
        })
    }
}
