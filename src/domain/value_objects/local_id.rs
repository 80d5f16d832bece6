use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Process-local record identifier, stable for the lifetime of the local
/// copy. Assigned by the writer, never by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalId(String);

impl LocalId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Local ID cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<LocalId> for String {
    fn from(value: LocalId) -> Self {
        value.0
    }
}
