use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the remote backend; absent until the first
/// successful create push.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Remote ID cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RemoteId> for String {
    fn from(value: RemoteId) -> Self {
        value.0
    }
}
