pub mod application;
pub mod domain;
pub mod engine;
pub mod infrastructure;
pub mod shared;

pub use engine::SyncEngine;
pub use shared::config::SyncEngineConfig;
pub use shared::error::{AppError, RemoteError, Result, RetryClass};

/// Initialize tracing for binaries and manual runs.
///
/// Library consumers embedding the engine should install their own
/// subscriber instead.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medsync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
