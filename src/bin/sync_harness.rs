use anyhow::Context;
use medsync::infrastructure::remote::{RestRemoteBackend, StaticSession};
use medsync::{SyncEngine, SyncEngineConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Manual exercise loop against a live backend: stage nothing, run one
/// cycle, print the diagnostics snapshot.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    medsync::init_logging();

    let config = SyncEngineConfig::from_env();
    let session: Arc<StaticSession> = match std::env::var("MEDSYNC_ACCESS_TOKEN") {
        Ok(token) => Arc::new(StaticSession::new(token)),
        Err(_) => Arc::new(StaticSession::unauthenticated()),
    };
    let remote = RestRemoteBackend::new(
        config.remote.base_url.clone(),
        Duration::from_secs(config.remote.request_timeout_secs),
        session,
    )
    .context("remote backend init")?;

    let engine = SyncEngine::new(config, Arc::new(remote))
        .await
        .context("engine init")?;
    engine.set_online(true);

    let outcome = engine.force_sync().await;
    info!("cycle outcome: {}", serde_json::to_string(&outcome)?);

    let snapshot = engine.diagnostics().await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
