// Command Domain Model

use serde::{Deserialize, Serialize};

/// Execution priority of a command.
///
/// CRITICAL commands bypass the queue and execute immediately in the
/// caller's context; every other priority goes through the bounded queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn is_critical(&self) -> bool {
        matches!(self, Priority::Critical)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "LOW"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::High => write!(f, "HIGH"),
            Priority::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A discrete operation request.
///
/// `submitted_at` is epoch millis. The transport boundary defaults it to the
/// current time when absent; the core only validates it (present, not in the
/// future). Immutable once validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub description: String,
    pub priority: Priority,
    pub author: String,
    pub submitted_at: Option<i64>,
}

impl Command {
    pub fn new(
        description: impl Into<String>,
        priority: Priority,
        author: impl Into<String>,
        submitted_at: Option<i64>,
    ) -> Self {
        Self {
            description: description.into(),
            priority,
            author: author.into(),
            submitted_at,
        }
    }
}
