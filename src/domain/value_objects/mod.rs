pub mod local_id;
pub mod mutation;
pub mod payload;
pub mod remote_id;
pub mod sync_status;
pub mod table;

pub use local_id::LocalId;
pub use mutation::MutationKind;
pub use payload::RecordPayload;
pub use remote_id::RemoteId;
pub use sync_status::SyncStatus;
pub use table::LogicalTable;
