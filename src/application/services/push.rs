use crate::application::ports::{LocalStore, MutationQueue, RemoteBackend};
use crate::application::services::diagnostics::SyncHealth;
use crate::domain::entities::{PushReport, QueueItem};
use crate::domain::value_objects::{MutationKind, RemoteId, SyncStatus};
use crate::shared::error::{AppError, RemoteError, RetryClass};
use chrono::{Duration, Utc};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

const BACKOFF_BASE_SECS: i64 = 5;
const BACKOFF_MAX_EXPONENT: i32 = 8;

/// Capped exponential backoff applied per queue item after a retryable
/// failure.
pub(crate) fn backoff_delay(consecutive_failures: i32) -> Duration {
    let capped = consecutive_failures.clamp(0, BACKOFF_MAX_EXPONENT);
    Duration::seconds(2_i64.pow(capped as u32) * BACKOFF_BASE_SECS)
}

enum ItemOutcome {
    /// Applied remotely (or resolved locally for never-synced deletes) and
    /// removed from the queue.
    Pushed,
    /// Removed without a remote call; the record vanished before processing.
    Discarded,
}

/// Drains the mutation queue against the remote backend. Failures are
/// per-item and never abort the pass; an in-progress guard makes
/// overlapping passes no-ops.
pub struct PushSynchronizer {
    store: Arc<dyn LocalStore>,
    queue: Arc<dyn MutationQueue>,
    remote: Arc<dyn RemoteBackend>,
    health: Arc<SyncHealth>,
    in_progress: AtomicBool,
}

impl PushSynchronizer {
    pub fn new(
        store: Arc<dyn LocalStore>,
        queue: Arc<dyn MutationQueue>,
        remote: Arc<dyn RemoteBackend>,
        health: Arc<SyncHealth>,
    ) -> Self {
        Self {
            store,
            queue,
            remote,
            health,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Run one push pass. A pass requested while another is running returns
    /// an empty report without touching the queue.
    pub async fn run_pass(&self) -> Result<PushReport, AppError> {
        if self.in_progress.swap(true, Ordering::SeqCst) {
            debug!("push pass already in progress; skipping");
            return Ok(PushReport::default());
        }
        let result = self.drain().await;
        self.in_progress.store(false, Ordering::SeqCst);
        result
    }

    async fn drain(&self) -> Result<PushReport, AppError> {
        let items = self.queue.list().await?;
        let mut report = PushReport::default();
        if items.is_empty() {
            return Ok(report);
        }

        let now = Utc::now();
        for item in items {
            if !item.is_due(now) {
                report.deferred += 1;
                continue;
            }
            report.attempted += 1;

            // Safety net for rows that predate the bury-on-failure path.
            if item.retries_exhausted() {
                self.bury_item(&item, "retry budget exhausted").await?;
                report.buried += 1;
                continue;
            }

            match self.push_item(&item).await {
                Ok(ItemOutcome::Pushed) => {
                    report.pushed += 1;
                    self.health.clear_table_error(item.table).await;
                }
                Ok(ItemOutcome::Discarded) => {
                    report.discarded += 1;
                }
                Err(err) => {
                    self.health
                        .record_table_error(item.table, err.to_string())
                        .await;
                    match err.retry_class() {
                        RetryClass::ReauthRequired => {
                            // Session is gone for the whole cycle; stop here
                            // without consuming anyone's retry budget.
                            warn!(
                                "session rejected while pushing {} item {}; aborting pass: {}",
                                item.table, item.id, err
                            );
                            report.auth_interrupted = true;
                            break;
                        }
                        RetryClass::Permanent => {
                            warn!(
                                "non-retryable failure for {} item {}: {}",
                                item.table, item.id, err
                            );
                            // The failed attempt itself counts in the
                            // dead-letter record.
                            let mut failed = item.clone();
                            failed.retry_count += 1;
                            self.bury_item(&failed, &err.to_string()).await?;
                            report.buried += 1;
                        }
                        RetryClass::Retryable => {
                            let failures = item.retry_count + 1;
                            if failures >= item.max_retries {
                                warn!(
                                    "{} item {} exhausted {} retries: {}",
                                    item.table, item.id, item.max_retries, err
                                );
                                let mut exhausted = item.clone();
                                exhausted.retry_count = failures;
                                self.bury_item(&exhausted, &err.to_string()).await?;
                                report.buried += 1;
                            } else {
                                let next_attempt = Utc::now() + backoff_delay(failures);
                                warn!(
                                    "push of {} item {} failed (attempt {}/{}), retrying after {}: {}",
                                    item.table, item.id, failures, item.max_retries, next_attempt, err
                                );
                                self.queue
                                    .record_failure(item.id, &err.to_string(), next_attempt)
                                    .await?;
                                report.failed += 1;
                            }
                        }
                    }
                }
            }
        }
        Ok(report)
    }

    /// Move an item to the dead-letter table and flag its record so the
    /// stuck state stays visible.
    async fn bury_item(&self, item: &QueueItem, reason: &str) -> Result<(), AppError> {
        self.queue.bury(item, reason).await?;
        if self.store.get(item.table, &item.local_id).await?.is_some() {
            self.store
                .set_status(item.table, &item.local_id, SyncStatus::Error)
                .await?;
        }
        Ok(())
    }

    async fn push_item(&self, item: &QueueItem) -> Result<ItemOutcome, AppError> {
        let record = self.store.get(item.table, &item.local_id).await?;

        match item.kind {
            MutationKind::Create | MutationKind::Update => {
                let Some(record) = record else {
                    // Deleted locally after enqueue; nothing left to sync.
                    debug!(
                        "{} record {} gone before push; discarding item {}",
                        item.table, item.local_id, item.id
                    );
                    self.queue.remove(item.id).await?;
                    return Ok(ItemOutcome::Discarded);
                };

                // Latest-known payload wins over the enqueue-time snapshot.
                let mut row = item.table.to_remote_row(&record.payload);
                let known_remote_id = record.remote_id.clone().or_else(|| item.remote_id.clone());
                if let Some(remote_id) = &known_remote_id {
                    // Keying the upsert makes replays after a lost ack harmless.
                    row.insert("id".to_string(), Value::String(remote_id.to_string()));
                }

                let stored = self
                    .remote
                    .upsert(item.table.remote_table(), Value::Object(row))
                    .await?;
                let remote_id = match extract_remote_id(&stored)? {
                    Some(id) => id,
                    None => known_remote_id.ok_or_else(|| {
                        AppError::Remote(RemoteError::Schema(
                            "upsert response carries no id".to_string(),
                        ))
                    })?,
                };

                self.store
                    .mark_synced(item.table, &item.local_id, &remote_id)
                    .await?;
                self.queue.remove(item.id).await?;
                Ok(ItemOutcome::Pushed)
            }
            MutationKind::Delete => {
                let remote_id = record
                    .as_ref()
                    .and_then(|r| r.remote_id.clone())
                    .or_else(|| item.remote_id.clone());
                if let Some(remote_id) = remote_id {
                    self.remote
                        .delete(item.table.remote_table(), remote_id.as_str())
                        .await?;
                }
                if record.is_some() {
                    self.store.delete(item.table, &item.local_id).await?;
                }
                self.queue.remove(item.id).await?;
                Ok(ItemOutcome::Pushed)
            }
        }
    }
}

/// Pull the assigned id out of an upsert response. Accepts a bare object or
/// a one-row representation array.
fn extract_remote_id(stored: &Value) -> Result<Option<RemoteId>, AppError> {
    let object = match stored {
        Value::Array(rows) => rows.first(),
        value @ Value::Object(_) => Some(value),
        _ => None,
    };
    let Some(Value::Object(map)) = object else {
        return Ok(None);
    };
    match map.get("id") {
        Some(Value::String(s)) => Ok(Some(RemoteId::new(s.clone()).map_err(AppError::InvalidInput)?)),
        Some(Value::Number(n)) => {
            Ok(Some(RemoteId::new(n.to_string()).map_err(AppError::InvalidInput)?))
        }
        _ => Ok(None),
    }
}
