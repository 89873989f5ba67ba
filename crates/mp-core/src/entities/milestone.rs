use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rollup::MilestoneKind;

/// A phase of a project. The milestone literally named `Support` rolls up
/// from tickets instead of tasks.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Milestone {
    pub id: String,
    pub project_id: String,
    pub name: String,
    /// Free-form; conventionally `Open`, `In Progress`, or `Completed`.
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub actual_date: Option<DateTime<Utc>>,
    pub estimated_date: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Milestone {
    #[must_use]
    pub fn kind(&self) -> MilestoneKind {
        MilestoneKind::from_name(&self.name)
    }

    #[must_use]
    pub fn is_support(&self) -> bool {
        self.kind() == MilestoneKind::Support
    }
}
