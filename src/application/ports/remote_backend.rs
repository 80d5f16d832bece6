use crate::shared::error::RemoteError;
use async_trait::async_trait;
use serde_json::Value;

/// Boundary to the hosted relational backend. Table names here are always
/// in the remote vocabulary; translation happens before the call.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Idempotent write keyed by the row's `id` when present; the remote
    /// assigns an id otherwise. Returns the stored row.
    async fn upsert(&self, table: &str, row: Value) -> Result<Value, RemoteError>;

    /// Partial update of the row identified by `key`. The queue drain
    /// routes record updates through `upsert`; this verb completes the
    /// backend surface for callers patching a known row directly.
    async fn update(&self, table: &str, patch: Value, key: &str) -> Result<(), RemoteError>;

    async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteError>;

    /// Fetch up to `limit` rows. Rows beyond the page are not fetched.
    async fn select(&self, table: &str, limit: u32) -> Result<Vec<Value>, RemoteError>;
}

/// Supplies a valid session credential before each remote call. Absence or
/// expiry surfaces as `RemoteError::Auth`.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, RemoteError>;
}
