use crate::application::ports::{LocalStore, MutationQueue, NetworkMonitor, RemoteBackend};
use crate::application::services::{
    Diagnostics, DiagnosticsSnapshot, PullSynchronizer, PushSynchronizer, SyncHealth,
    SyncScheduler,
};
use crate::domain::entities::{CycleOutcome, LocalRecord, QueueItemDraft};
use crate::domain::value_objects::{LocalId, LogicalTable, MutationKind, RecordPayload, SyncStatus};
use crate::infrastructure::database::Database;
use crate::infrastructure::network::ConnectivityMonitor;
use crate::infrastructure::storage::{SqliteLocalStore, SqliteMutationQueue};
use crate::shared::config::SyncEngineConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Composition root: owns the store, the queue, both synchronizers and the
/// scheduler, and exposes the write path the embedding application uses.
///
/// Every write lands locally first and enqueues a mutation; nothing on this
/// surface ever blocks on the network.
pub struct SyncEngine {
    config: SyncEngineConfig,
    store: Arc<dyn LocalStore>,
    queue: Arc<dyn MutationQueue>,
    network: Arc<ConnectivityMonitor>,
    scheduler: Arc<SyncScheduler>,
    diagnostics: Diagnostics,
}

impl SyncEngine {
    /// Open the local database, run migrations and wire the services. The
    /// engine starts offline until connectivity is reported.
    pub async fn new(
        config: SyncEngineConfig,
        remote: Arc<dyn RemoteBackend>,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::Configuration)?;
        let database =
            Database::initialize(&config.database.url, config.database.max_connections).await?;
        let pool = database.pool().clone();

        let store: Arc<dyn LocalStore> = Arc::new(SqliteLocalStore::new(pool.clone()));
        let queue: Arc<dyn MutationQueue> = Arc::new(SqliteMutationQueue::new(pool));
        let network = Arc::new(ConnectivityMonitor::new(false));
        let health = Arc::new(SyncHealth::new());

        let push = Arc::new(PushSynchronizer::new(
            store.clone(),
            queue.clone(),
            remote.clone(),
            health.clone(),
        ));
        let pull = Arc::new(PullSynchronizer::new(
            store.clone(),
            remote,
            health.clone(),
            config.sync.pull_page_size,
        ));
        let network_port: Arc<dyn NetworkMonitor> = network.clone();
        let scheduler = Arc::new(SyncScheduler::new(
            push,
            pull,
            network_port.clone(),
            health.clone(),
        ));
        let diagnostics = Diagnostics::new(store.clone(), queue.clone(), network_port, health);

        Ok(Self {
            config,
            store,
            queue,
            network,
            scheduler,
            diagnostics,
        })
    }

    /// Arm periodic syncing if the configuration enables it. The first tick
    /// fires immediately, draining anything staged while the app was closed.
    pub fn start(&self) {
        if !self.config.sync.auto_sync {
            info!("auto sync disabled; cycles run on demand only");
            return;
        }
        self.scheduler
            .start(Duration::from_secs(self.config.sync.sync_interval_secs));
    }

    /// Stage a new record locally and queue its creation for push.
    pub async fn create_record(
        &self,
        table: LogicalTable,
        payload: RecordPayload,
    ) -> Result<LocalRecord, AppError> {
        let record = LocalRecord::new_pending_create(table, payload);
        self.store.put(&record).await?;
        self.queue
            .enqueue(QueueItemDraft::new(
                table,
                MutationKind::Create,
                record.local_id.clone(),
                record.payload.clone(),
                None,
                self.config.sync.max_retries,
            ))
            .await?;
        Ok(record)
    }

    /// Overlay `patch` onto the record and queue the change. A record whose
    /// creation has not been pushed yet stays a pending create; the eventual
    /// push carries the merged payload.
    pub async fn update_record(
        &self,
        table: LogicalTable,
        local_id: &LocalId,
        patch: RecordPayload,
    ) -> Result<LocalRecord, AppError> {
        let mut record = self
            .store
            .get(table, local_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{table}/{local_id}")))?;

        let (status, kind) = if record.sync_status == SyncStatus::PendingCreate {
            (SyncStatus::PendingCreate, MutationKind::Create)
        } else {
            (SyncStatus::PendingUpdate, MutationKind::Update)
        };
        let merged = record.payload.merged_with(&patch);
        record.apply_local_change(merged, status);
        self.store.update(&record).await?;

        self.queue
            .enqueue(QueueItemDraft::new(
                table,
                kind,
                record.local_id.clone(),
                record.payload.clone(),
                record.remote_id.clone(),
                self.config.sync.max_retries,
            ))
            .await?;
        Ok(record)
    }

    /// Mark the record for deletion and queue it. The queue item snapshots
    /// the remote id so the remote row is removed even after the local copy
    /// is gone.
    pub async fn delete_record(
        &self,
        table: LogicalTable,
        local_id: &LocalId,
    ) -> Result<(), AppError> {
        let mut record = self
            .store
            .get(table, local_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{table}/{local_id}")))?;

        let remote_id = record.remote_id.clone();
        record.apply_local_change(record.payload.clone(), SyncStatus::PendingDelete);
        self.store.update(&record).await?;

        self.queue
            .enqueue(QueueItemDraft::new(
                table,
                MutationKind::Delete,
                record.local_id.clone(),
                record.payload.clone(),
                remote_id,
                self.config.sync.max_retries,
            ))
            .await?;
        Ok(())
    }

    pub async fn get_record(
        &self,
        table: LogicalTable,
        local_id: &LocalId,
    ) -> Result<Option<LocalRecord>, AppError> {
        self.store.get(table, local_id).await
    }

    pub async fn list_records(&self, table: LogicalTable) -> Result<Vec<LocalRecord>, AppError> {
        self.store.list(table).await
    }

    /// Run a full push-then-pull cycle now.
    pub async fn force_sync(&self) -> CycleOutcome {
        self.scheduler.force_sync().await
    }

    /// Feed the engine the platform's connectivity signal. An offline to
    /// online edge triggers a catch-up cycle once `start` has been called.
    pub fn set_online(&self, online: bool) {
        self.network.set_online(online);
    }

    pub fn is_online(&self) -> bool {
        self.network.is_online()
    }

    /// Handle for platform shells that hold onto the monitor directly.
    pub fn network(&self) -> Arc<ConnectivityMonitor> {
        self.network.clone()
    }

    pub async fn diagnostics(&self) -> Result<DiagnosticsSnapshot, AppError> {
        self.diagnostics.snapshot().await
    }
}
