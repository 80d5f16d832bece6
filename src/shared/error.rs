use thiserror::Error;

/// Retry policy classification for remote failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Transient; the queue item stays queued and is retried with backoff.
    Retryable,
    /// Not worth retrying; the item is buried immediately.
    Permanent,
    /// Session invalid; the rest of the pass is aborted without consuming
    /// retry budget.
    ReauthRequired,
}

/// Failures reported by the remote backend boundary.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("remote constraint violation: {0}")]
    Constraint(String),

    #[error("schema mismatch: {0}")]
    Schema(String),

    #[error("remote backend error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl RemoteError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Map an HTTP status into the matching error variant.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Auth(message.into()),
            409 => Self::Constraint(message.into()),
            400 | 404 | 422 => Self::Schema(message.into()),
            _ => Self::api(status, message),
        }
    }

    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Network(_) | Self::Constraint(_) => RetryClass::Retryable,
            Self::Auth(_) => RetryClass::ReauthRequired,
            Self::Schema(_) => RetryClass::Permanent,
            Self::Api { status, .. } => match status {
                408 | 423 | 425 | 429 => RetryClass::Retryable,
                500..=599 => RetryClass::Retryable,
                _ => RetryClass::Permanent,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Retry classification for push-item failures. Local storage errors
    /// are treated as transient.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Remote(remote) => remote.retry_class(),
            Self::InvalidInput(_) | Self::Serialization(_) => RetryClass::Permanent,
            _ => RetryClass::Retryable,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_class_for_remote_variants() {
        assert_eq!(
            RemoteError::Network("timeout".into()).retry_class(),
            RetryClass::Retryable
        );
        assert_eq!(
            RemoteError::Auth("expired".into()).retry_class(),
            RetryClass::ReauthRequired
        );
        assert_eq!(
            RemoteError::Schema("unknown column".into()).retry_class(),
            RetryClass::Permanent
        );
        assert_eq!(
            RemoteError::Constraint("duplicate key".into()).retry_class(),
            RetryClass::Retryable
        );
    }

    #[test]
    fn retry_class_from_http_status() {
        assert_eq!(
            RemoteError::api(500, "boom").retry_class(),
            RetryClass::Retryable
        );
        assert_eq!(
            RemoteError::api(429, "slow down").retry_class(),
            RetryClass::Retryable
        );
        assert_eq!(
            RemoteError::from_status(401, "no session").retry_class(),
            RetryClass::ReauthRequired
        );
        assert_eq!(
            RemoteError::from_status(400, "bad column").retry_class(),
            RetryClass::Permanent
        );
    }
}
