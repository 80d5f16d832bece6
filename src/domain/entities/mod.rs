pub mod cycle;
pub mod dead_letter;
pub mod queue_item;
pub mod record;

pub use cycle::{CycleOutcome, MergeStats, PullReport, PushReport, StatusCount};
pub use dead_letter::DeadLetter;
pub use queue_item::{QueueItem, QueueItemDraft};
pub use record::{LocalRecord, RemoteSnapshotRow};
