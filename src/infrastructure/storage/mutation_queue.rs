use crate::application::ports::MutationQueue;
use crate::domain::entities::{DeadLetter, QueueItem, QueueItemDraft};
use crate::domain::value_objects::LogicalTable;
use crate::infrastructure::database::DbPool;
use crate::infrastructure::storage::rows::{DeadLetterRow, QueueRow};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

const QUEUE_COLUMNS: &str = "id, table_name, operation, local_id, payload, remote_id, \
     retry_count, max_retries, next_attempt_at, last_error, created_at";

/// `MutationQueue` backed by the shared SQLite pool. Insertion order is the
/// autoincrement id; drains read in that order.
pub struct SqliteMutationQueue {
    pool: DbPool,
}

impl SqliteMutationQueue {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MutationQueue for SqliteMutationQueue {
    async fn enqueue(&self, draft: QueueItemDraft) -> Result<i64, AppError> {
        let payload = draft.payload.to_json_string().map_err(AppError::Serialization)?;
        let now = Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT INTO sync_queue
                 (table_name, operation, local_id, payload, remote_id,
                  retry_count, max_retries, next_attempt_at, last_error, created_at)
             VALUES (?, ?, ?, ?, ?, 0, ?, ?, NULL, ?)",
        )
        .bind(draft.table.as_str())
        .bind(draft.kind.as_str())
        .bind(draft.local_id.as_str())
        .bind(payload)
        .bind(draft.remote_id.as_ref().map(|id| id.as_str().to_string()))
        .bind(draft.max_retries)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn list(&self) -> Result<Vec<QueueItem>, AppError> {
        let rows = sqlx::query_as::<_, QueueRow>(&format!(
            "SELECT {QUEUE_COLUMNS} FROM sync_queue ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(QueueItem::try_from).collect()
    }

    async fn list_for_table(&self, table: LogicalTable) -> Result<Vec<QueueItem>, AppError> {
        let rows = sqlx::query_as::<_, QueueRow>(&format!(
            "SELECT {QUEUE_COLUMNS} FROM sync_queue WHERE table_name = ? ORDER BY id"
        ))
        .bind(table.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(QueueItem::try_from).collect()
    }

    async fn remove(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sync_queue WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_failure(
        &self,
        id: i64,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE sync_queue
             SET retry_count = retry_count + 1, last_error = ?, next_attempt_at = ?
             WHERE id = ?",
        )
        .bind(error)
        .bind(next_attempt_at.timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn bury(&self, item: &QueueItem, reason: &str) -> Result<(), AppError> {
        let payload = item.payload.to_json_string().map_err(AppError::Serialization)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO dead_letters
                 (table_name, operation, local_id, payload, retry_count, reason, buried_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(item.table.as_str())
        .bind(item.kind.as_str())
        .bind(item.local_id.as_str())
        .bind(payload)
        .bind(item.retry_count)
        .bind(reason)
        .bind(Utc::now().timestamp())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM sync_queue WHERE id = ?")
            .bind(item.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn depth(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sync_queue")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn dead_letters(&self) -> Result<Vec<DeadLetter>, AppError> {
        let rows = sqlx::query_as::<_, DeadLetterRow>(
            "SELECT id, table_name, operation, local_id, payload, retry_count, reason, buried_at
             FROM dead_letters ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DeadLetter::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{LocalId, MutationKind, RecordPayload};
    use crate::infrastructure::database::MIGRATOR;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn queue() -> SqliteMutationQueue {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        MIGRATOR.run(&pool).await.expect("migrations");
        SqliteMutationQueue::new(pool)
    }

    fn draft(kind: MutationKind, name: &str) -> QueueItemDraft {
        QueueItemDraft::new(
            LogicalTable::Patients,
            kind,
            LocalId::generate(),
            RecordPayload::new(json!({"name": name})).unwrap(),
            None,
            3,
        )
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let queue = queue().await;
        queue.enqueue(draft(MutationKind::Create, "first")).await.unwrap();
        queue.enqueue(draft(MutationKind::Update, "second")).await.unwrap();
        queue.enqueue(draft(MutationKind::Delete, "third")).await.unwrap();

        let items = queue.list().await.unwrap();

        let kinds: Vec<_> = items.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![MutationKind::Create, MutationKind::Update, MutationKind::Delete]
        );
        assert!(items.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn new_items_are_immediately_due() {
        let queue = queue().await;
        queue.enqueue(draft(MutationKind::Create, "now")).await.unwrap();

        let items = queue.list().await.unwrap();

        assert_eq!(items[0].retry_count, 0);
        assert!(items[0].last_error.is_none());
        assert!(items[0].is_due(Utc::now()));
    }

    #[tokio::test]
    async fn record_failure_increments_and_defers() {
        let queue = queue().await;
        let id = queue.enqueue(draft(MutationKind::Create, "flaky")).await.unwrap();
        let later = Utc::now() + chrono::Duration::seconds(60);

        queue.record_failure(id, "timeout", later).await.unwrap();

        let items = queue.list().await.unwrap();
        assert_eq!(items[0].retry_count, 1);
        assert_eq!(items[0].last_error.as_deref(), Some("timeout"));
        assert!(!items[0].is_due(Utc::now()));
        assert!(items[0].is_due(later));
    }

    #[tokio::test]
    async fn bury_moves_the_item_to_dead_letters() {
        let queue = queue().await;
        queue.enqueue(draft(MutationKind::Create, "doomed")).await.unwrap();
        let item = queue.list().await.unwrap().remove(0);

        queue.bury(&item, "schema mismatch").await.unwrap();

        assert_eq!(queue.depth().await.unwrap(), 0);
        let dead = queue.dead_letters().await.unwrap();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].local_id, item.local_id);
        assert_eq!(dead[0].reason, "schema mismatch");
        assert_eq!(dead[0].payload, item.payload);
    }

    #[tokio::test]
    async fn list_for_table_filters_other_tables() {
        let queue = queue().await;
        queue.enqueue(draft(MutationKind::Create, "patient")).await.unwrap();
        let mut other = draft(MutationKind::Create, "invoice");
        other.table = LogicalTable::Invoices;
        queue.enqueue(other).await.unwrap();

        let patients = queue.list_for_table(LogicalTable::Patients).await.unwrap();
        let invoices = queue.list_for_table(LogicalTable::Invoices).await.unwrap();

        assert_eq!(patients.len(), 1);
        assert_eq!(invoices.len(), 1);
        assert_eq!(patients[0].table, LogicalTable::Patients);
    }
}
