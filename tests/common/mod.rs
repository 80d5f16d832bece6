pub mod mocks;

use medsync::{SyncEngine, SyncEngineConfig};
use mocks::MockRemoteBackend;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestHarness {
    pub engine: SyncEngine,
    pub remote: Arc<MockRemoteBackend>,
    // Held for its Drop; deletes the database directory.
    _dir: TempDir,
}

/// An engine over a fresh on-disk database and a recording remote, started
/// offline like a cold application launch.
pub async fn harness() -> TestHarness {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = SyncEngineConfig::default();
    config.database.url = format!("sqlite://{}/medsync.db", dir.path().display());
    config.sync.auto_sync = false;

    let remote = Arc::new(MockRemoteBackend::default());
    let engine = SyncEngine::new(config, remote.clone())
        .await
        .expect("engine init");

    TestHarness {
        engine,
        remote,
        _dir: dir,
    }
}
