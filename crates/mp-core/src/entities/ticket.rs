use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A support issue raised against a milestone (normally `Support`),
/// optionally pointing at the task it concerns.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Ticket {
    pub id: String,
    pub milestone_id: String,
    pub task_id: Option<String>,
    pub title: String,
    /// Free-form; conventionally `Open`, `In Progress`, `Completed`, or `Closed`.
    pub status: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
