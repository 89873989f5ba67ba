use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A reusable delivery plan carrying estimated durations.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Estimated duration of a milestone, matched by name.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TemplateMilestone {
    pub id: String,
    pub template_id: String,
    pub name: String,
    pub estimated_days: i64,
}

/// Estimated duration of a task, matched by title within its template milestone.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TemplateTask {
    pub id: String,
    pub template_milestone_id: String,
    pub title: String,
    pub estimated_days: i64,
}
