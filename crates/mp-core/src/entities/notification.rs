use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A message addressed to one user.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    /// Machine-readable kind, e.g. `task_completed`.
    pub kind: String,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub const KIND_TASK_COMPLETED: &'static str = "task_completed";
}
