//! Outcome types returned by the status engine and printed by `mpost`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Milestone, Project, Task, Ticket};
use crate::enums::ProjectStatus;

/// Result of `task status`: the updated task plus whichever ancestors changed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TaskStatusUpdate {
    pub task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
}

/// Result of `ticket status`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TicketStatusUpdate {
    pub ticket: Ticket,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
}

/// Header of a status snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TaskSummary {
    pub id: String,
    pub title: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MilestoneStatusDetail {
    pub id: String,
    pub name: String,
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub tasks: Vec<TaskSummary>,
}

/// Read-only snapshot of a project tree's statuses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProjectStatusDetails {
    pub project: ProjectSummary,
    pub milestones: Vec<MilestoneStatusDetail>,
}

/// Per-project outcome of a bulk recompute.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProjectRecomputeResult {
    pub project_id: String,
    pub success: bool,
    pub status: Option<ProjectStatus>,
    pub milestones_changed: u32,
    pub project_changed: bool,
    pub error: Option<String>,
}

/// Response from `mpost recompute-all`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BulkRecomputeReport {
    pub results: Vec<ProjectRecomputeResult>,
    pub succeeded: u32,
    pub failed: u32,
    /// Number of milestone and project rows rewritten. Zero on a repeated run.
    pub writes: u32,
}

impl BulkRecomputeReport {
    #[must_use]
    pub fn from_results(results: Vec<ProjectRecomputeResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        let failed = results.len() - succeeded;
        let writes = results
            .iter()
            .map(|r| r.milestones_changed + u32::from(r.project_changed))
            .sum();
        Self {
            results,
            succeeded: u32::try_from(succeeded).unwrap_or(u32::MAX),
            failed: u32::try_from(failed).unwrap_or(u32::MAX),
            writes,
        }
    }
}
