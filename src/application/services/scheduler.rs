use crate::application::ports::NetworkMonitor;
use crate::application::services::diagnostics::SyncHealth;
use crate::application::services::pull::PullSynchronizer;
use crate::application::services::push::PushSynchronizer;
use crate::domain::entities::CycleOutcome;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Drives push-then-pull cycles from three triggers: the periodic timer
/// (whose first tick doubles as the startup catch-up), explicit force-sync
/// calls, and offline-to-online transitions. A cycle arriving while one is
/// running is skipped, not queued.
pub struct SyncScheduler {
    push: Arc<PushSynchronizer>,
    pull: Arc<PullSynchronizer>,
    network: Arc<dyn NetworkMonitor>,
    health: Arc<SyncHealth>,
    in_progress: AtomicBool,
}

impl SyncScheduler {
    pub fn new(
        push: Arc<PushSynchronizer>,
        pull: Arc<PullSynchronizer>,
        network: Arc<dyn NetworkMonitor>,
        health: Arc<SyncHealth>,
    ) -> Self {
        Self {
            push,
            pull,
            network,
            health,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Run one full cycle now, ignoring the timer. Never panics or returns
    /// an error; failures end the cycle and are reported in the outcome.
    pub async fn force_sync(&self) -> CycleOutcome {
        info!("forced sync requested");
        self.run_cycle().await
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        if self.in_progress.swap(true, Ordering::SeqCst) {
            debug!("sync cycle already running; skipping trigger");
            return CycleOutcome::AlreadyRunning;
        }
        let outcome = self.cycle_inner().await;
        self.in_progress.store(false, Ordering::SeqCst);
        outcome
    }

    pub fn is_running(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    async fn cycle_inner(&self) -> CycleOutcome {
        if !self.network.is_online() {
            debug!("offline; skipping sync cycle");
            return CycleOutcome::Offline;
        }

        let push = match self.push.run_pass().await {
            Ok(report) => report,
            Err(err) => {
                error!("push pass failed: {}", err);
                self.health.mark_cycle_failed().await;
                return CycleOutcome::Failed;
            }
        };

        // Pull follows every completed push pass; per-item push failures do
        // not block the refresh.
        let pull = self.pull.run_pass().await;

        self.health.mark_cycle_completed().await;
        debug!(
            "sync cycle complete: pushed {}, buried {}, pulled {} tables",
            push.pushed, push.buried, pull.tables_refreshed
        );
        CycleOutcome::Completed { push, pull }
    }

    /// Arm the periodic timer and the reconnect watcher. The interval's
    /// immediate first tick provides the on-start catch-up cycle.
    pub fn start(self: &Arc<Self>, interval: Duration) {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                scheduler.run_cycle().await;
            }
        });

        let scheduler = Arc::clone(self);
        let mut rx = self.network.subscribe();
        tokio::spawn(async move {
            let mut was_online = *rx.borrow();
            while rx.changed().await.is_ok() {
                let online = *rx.borrow();
                if online && !was_online {
                    info!("connectivity restored; running catch-up sync");
                    scheduler.run_cycle().await;
                }
                was_online = online;
            }
        });
    }
}
