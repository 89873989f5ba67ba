//! Status vocabularies, entity types, and actions for Milepost.
//!
//! Task, ticket, and milestone statuses are stored as free-form text (legacy
//! rows may carry any spelling), so [`WorkStatus`] is a parsing lens over that
//! text rather than the column type. Project status is a closed set and is
//! stored through [`ProjectStatus`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Normalize a status label for comparison: trim, lowercase, and fold `_`/`-` to spaces.
fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '_' | '-' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// WorkStatus
// ---------------------------------------------------------------------------

/// Status of a task, ticket, or milestone.
///
/// ```text
/// Open → In Progress → Completed
///                    → Closed       (tickets only)
/// Approval                          (legacy, counts as In Progress)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum WorkStatus {
    #[serde(rename = "Open")]
    Open,
    #[serde(rename = "In Progress", alias = "in_progress")]
    InProgress,
    #[serde(rename = "Approval")]
    Approval,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Closed")]
    Closed,
}

impl WorkStatus {
    /// Statuses a caller may assign to a task.
    pub const TASK_TARGETS: &'static [Self] = &[Self::Open, Self::InProgress, Self::Completed];

    /// Statuses a caller may assign to a ticket.
    pub const TICKET_TARGETS: &'static [Self] =
        &[Self::Open, Self::InProgress, Self::Completed, Self::Closed];

    /// Canonical label used in storage and API output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Approval => "Approval",
            Self::Completed => "Completed",
            Self::Closed => "Closed",
        }
    }

    /// Lenient parse of a stored label. Returns `None` for unknown text.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "open" => Some(Self::Open),
            "in progress" | "inprogress" => Some(Self::InProgress),
            "approval" => Some(Self::Approval),
            "completed" => Some(Self::Completed),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Parse a caller-supplied target status, restricted to `allowed`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the label is unknown or not allowed.
    pub fn parse_target(s: &str, allowed: &[Self]) -> Result<Self, CoreError> {
        let status = Self::parse(s).ok_or_else(|| {
            CoreError::Validation(format!("unknown status '{}'", s.trim()))
        })?;
        if allowed.contains(&status) {
            Ok(status)
        } else {
            let names = allowed.iter().map(|s| s.as_str()).collect::<Vec<_>>();
            Err(CoreError::Validation(format!(
                "status '{status}' is not allowed here (expected one of: {})",
                names.join(", ")
            )))
        }
    }

    /// Whether a stored label denotes this status.
    #[must_use]
    pub fn matches(self, stored: &str) -> bool {
        Self::parse(stored) == Some(self)
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::Validation(format!("unknown status '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

/// Status of a project. Only `Open`, `In Progress`, and `Completed` are ever
/// produced by the roll-up; the others exist for rows written by other tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ProjectStatus {
    #[serde(rename = "Open")]
    Open,
    #[serde(rename = "In Progress", alias = "in_progress")]
    InProgress,
    #[serde(rename = "Final")]
    Final,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Cancelled")]
    Cancelled,
    #[serde(rename = "On Hold", alias = "on_hold")]
    OnHold,
}

impl ProjectStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Final => "Final",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::OnHold => "On Hold",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "open" => Some(Self::Open),
            "in progress" | "inprogress" => Some(Self::InProgress),
            "final" => Some(Self::Final),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            "on hold" | "onhold" => Some(Self::OnHold),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| CoreError::Validation(format!("unknown project status '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// Role of a staff user. Admins receive task-completion notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Staff,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Entity types, used in audit entries and not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Project,
    Milestone,
    Task,
    Ticket,
    Template,
    User,
    Notification,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Milestone => "milestone",
            Self::Task => "task",
            Self::Ticket => "ticket",
            Self::Template => "template",
            Self::User => "user",
            Self::Notification => "notification",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Deleted,
    StatusChanged,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Deleted => "deleted",
            Self::StatusChanged => "status_changed",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
