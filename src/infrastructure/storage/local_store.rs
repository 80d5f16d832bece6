use crate::application::ports::LocalStore;
use crate::domain::entities::{LocalRecord, MergeStats, RemoteSnapshotRow, StatusCount};
use crate::domain::value_objects::{LocalId, LogicalTable, RemoteId, SyncStatus};
use crate::infrastructure::database::DbPool;
use crate::infrastructure::storage::rows::RecordRow;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

/// `LocalStore` backed by the shared SQLite pool.
pub struct SqliteLocalStore {
    pool: DbPool,
}

impl SqliteLocalStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn get(
        &self,
        table: LogicalTable,
        local_id: &LocalId,
    ) -> Result<Option<LocalRecord>, AppError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT table_name, local_id, remote_id, payload, sync_status, created_at, updated_at
             FROM records WHERE table_name = ? AND local_id = ?",
        )
        .bind(table.as_str())
        .bind(local_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(LocalRecord::try_from).transpose()
    }

    async fn put(&self, record: &LocalRecord) -> Result<(), AppError> {
        let payload = record.payload.to_json_string().map_err(AppError::Serialization)?;
        sqlx::query(
            "INSERT INTO records (table_name, local_id, remote_id, payload, sync_status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.table.as_str())
        .bind(record.local_id.as_str())
        .bind(record.remote_id.as_ref().map(|id| id.as_str().to_string()))
        .bind(payload)
        .bind(record.sync_status.as_str())
        .bind(record.created_at.timestamp())
        .bind(record.updated_at.timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, record: &LocalRecord) -> Result<(), AppError> {
        let payload = record.payload.to_json_string().map_err(AppError::Serialization)?;
        let result = sqlx::query(
            "UPDATE records SET remote_id = ?, payload = ?, sync_status = ?, updated_at = ?
             WHERE table_name = ? AND local_id = ?",
        )
        .bind(record.remote_id.as_ref().map(|id| id.as_str().to_string()))
        .bind(payload)
        .bind(record.sync_status.as_str())
        .bind(record.updated_at.timestamp())
        .bind(record.table.as_str())
        .bind(record.local_id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "{}/{}",
                record.table, record.local_id
            )));
        }
        Ok(())
    }

    async fn delete(&self, table: LogicalTable, local_id: &LocalId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM records WHERE table_name = ? AND local_id = ?")
            .bind(table.as_str())
            .bind(local_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_remote_id(
        &self,
        table: LogicalTable,
        remote_id: &RemoteId,
    ) -> Result<Option<LocalRecord>, AppError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT table_name, local_id, remote_id, payload, sync_status, created_at, updated_at
             FROM records WHERE table_name = ? AND remote_id = ?",
        )
        .bind(table.as_str())
        .bind(remote_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(LocalRecord::try_from).transpose()
    }

    async fn list(&self, table: LogicalTable) -> Result<Vec<LocalRecord>, AppError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT table_name, local_id, remote_id, payload, sync_status, created_at, updated_at
             FROM records WHERE table_name = ? ORDER BY created_at, local_id",
        )
        .bind(table.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LocalRecord::try_from).collect()
    }

    async fn mark_synced(
        &self,
        table: LogicalTable,
        local_id: &LocalId,
        remote_id: &RemoteId,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE records SET remote_id = ?, sync_status = ?, updated_at = ?
             WHERE table_name = ? AND local_id = ?",
        )
        .bind(remote_id.as_str())
        .bind(SyncStatus::Synced.as_str())
        .bind(Utc::now().timestamp())
        .bind(table.as_str())
        .bind(local_id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_status(
        &self,
        table: LogicalTable,
        local_id: &LocalId,
        status: SyncStatus,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE records SET sync_status = ?, updated_at = ?
             WHERE table_name = ? AND local_id = ?",
        )
        .bind(status.as_str())
        .bind(Utc::now().timestamp())
        .bind(table.as_str())
        .bind(local_id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn merge_remote(
        &self,
        table: LogicalTable,
        rows: Vec<RemoteSnapshotRow>,
    ) -> Result<MergeStats, AppError> {
        let mut stats = MergeStats::default();
        let now = Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for row in rows {
            let payload = row.payload.to_json_string().map_err(AppError::Serialization)?;
            let updated = sqlx::query(
                "UPDATE records SET payload = ?, sync_status = ?, updated_at = ?
                 WHERE table_name = ? AND remote_id = ?",
            )
            .bind(&payload)
            .bind(SyncStatus::Synced.as_str())
            .bind(now)
            .bind(table.as_str())
            .bind(row.remote_id.as_str())
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() > 0 {
                stats.updated += 1;
                continue;
            }

            sqlx::query(
                "INSERT INTO records (table_name, local_id, remote_id, payload, sync_status, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(table.as_str())
            .bind(LocalId::generate().as_str())
            .bind(row.remote_id.as_str())
            .bind(&payload)
            .bind(SyncStatus::Synced.as_str())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            stats.inserted += 1;
        }

        tx.commit().await?;
        Ok(stats)
    }

    async fn count_by_status(&self) -> Result<Vec<StatusCount>, AppError> {
        let rows = sqlx::query(
            "SELECT sync_status, COUNT(*) AS count FROM records GROUP BY sync_status",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.try_get("sync_status")?;
            let count: i64 = row.try_get("count")?;
            counts.push(StatusCount {
                status: SyncStatus::parse(&status).map_err(AppError::Database)?,
                count,
            });
        }
        Ok(counts)
    }
}
