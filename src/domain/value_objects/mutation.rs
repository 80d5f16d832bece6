use serde::{Deserialize, Serialize};
use std::fmt;

/// The three push operations a queue item can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "create" => Ok(MutationKind::Create),
            "update" => Ok(MutationKind::Update),
            "delete" => Ok(MutationKind::Delete),
            other => Err(format!("Unknown mutation kind: {other}")),
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
