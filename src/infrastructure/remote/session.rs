use crate::application::ports::SessionProvider;
use crate::shared::error::RemoteError;
use async_trait::async_trait;

/// Session provider holding a fixed token, for harnesses and deployments
/// where the embedding application refreshes credentials out of band.
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A session with no credential; every remote call fails with an auth
    /// error until one is supplied.
    pub fn unauthenticated() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn access_token(&self) -> Result<String, RemoteError> {
        self.token
            .clone()
            .ok_or_else(|| RemoteError::Auth("no active session".to_string()))
    }
}
