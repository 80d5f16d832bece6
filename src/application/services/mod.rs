pub mod diagnostics;
pub mod pull;
pub mod push;
pub mod scheduler;

pub use diagnostics::{Diagnostics, DiagnosticsSnapshot, SyncHealth, TableFailure};
pub use pull::PullSynchronizer;
pub use push::PushSynchronizer;
pub use scheduler::SyncScheduler;
