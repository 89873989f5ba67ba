//! Ports the engine depends on.
//!
//! The engine never reaches for a global repository: a [`DeliveryStore`] and a
//! [`TemplateLookup`] are injected, and notifications leave through a
//! [`NotificationSink`]. Every read through these ports excludes soft-deleted
//! rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mp_core::entities::{Milestone, Project, Task, Ticket};
use mp_core::enums::{AuditAction, EntityType, WorkStatus};

use crate::error::StoreError;

/// Input for creating a project. Its Support milestone is created alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub template_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMilestone {
    pub project_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub milestone_id: String,
    pub title: String,
    pub status: WorkStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub milestone_id: String,
    pub task_id: Option<String>,
    pub title: String,
    pub status: WorkStatus,
}

/// Transactional load/save of the delivery tree.
///
/// `begin`/`commit`/`rollback` bracket one unit of work. Implementations
/// backed by a database must serialize concurrent writers (for SQLite,
/// `BEGIN IMMEDIATE`) and report contention as [`StoreError::Conflict`].
/// Units opened through clones of one store never overlap: a second `begin`
/// waits until the open unit ends (see [`crate::unit::UnitGate`]). A failed
/// `commit` leaves the unit open; the caller must `rollback`.
#[async_trait]
pub trait DeliveryStore: Send + Sync {
    async fn begin(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn commit(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn rollback(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError>;

    async fn list_project_ids(&self) -> Result<Vec<String>, StoreError>;

    async fn insert_project(
        &self,
        new: &NewProject,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError>;

    /// Persist `status`, `actual_start_date`, `actual_end_date`, `updated_at`.
    async fn save_project(&self, project: &Project) -> Result<(), StoreError>;

    async fn get_milestone(&self, id: &str) -> Result<Option<Milestone>, StoreError>;

    /// Milestones of a project in creation order.
    async fn list_milestones(&self, project_id: &str) -> Result<Vec<Milestone>, StoreError>;

    async fn insert_milestone(
        &self,
        new: &NewMilestone,
        now: DateTime<Utc>,
    ) -> Result<Milestone, StoreError>;

    /// Persist `status`, the four date fields, and `updated_at`.
    async fn save_milestone(&self, milestone: &Milestone) -> Result<(), StoreError>;

    async fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError>;

    /// Tasks of a milestone in creation order.
    async fn list_tasks(&self, milestone_id: &str) -> Result<Vec<Task>, StoreError>;

    async fn insert_task(&self, new: &NewTask, now: DateTime<Utc>) -> Result<Task, StoreError>;

    /// Persist `status`, `start_date`, `due_date`, `updated_at`.
    async fn save_task(&self, task: &Task) -> Result<(), StoreError>;

    async fn delete_task(&self, id: &str, now: DateTime<Utc>) -> Result<(), StoreError>;

    async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, StoreError>;

    /// Tickets of a milestone in creation order.
    async fn list_tickets(&self, milestone_id: &str) -> Result<Vec<Ticket>, StoreError>;

    async fn insert_ticket(
        &self,
        new: &NewTicket,
        now: DateTime<Utc>,
    ) -> Result<Ticket, StoreError>;

    /// Persist `status` and `updated_at`.
    async fn save_ticket(&self, ticket: &Ticket) -> Result<(), StoreError>;

    async fn delete_ticket(&self, id: &str, now: DateTime<Utc>) -> Result<(), StoreError>;

    async fn list_admin_user_ids(&self) -> Result<Vec<String>, StoreError>;

    async fn append_audit(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// Estimated durations from the project's delivery template.
///
/// Names match case-insensitively after trimming. Lookup failures are soft:
/// the engine logs them and leaves derived dates unset.
#[async_trait]
pub trait TemplateLookup: Send + Sync {
    async fn milestone_estimated_days(
        &self,
        template_id: &str,
        milestone_name: &str,
    ) -> Result<Option<i64>, StoreError>;

    async fn task_estimated_days(
        &self,
        template_id: &str,
        milestone_name: &str,
        task_title: &str,
    ) -> Result<Option<i64>, StoreError>;
}

/// Delivery of user notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(
        &self,
        user_id: &str,
        kind: &str,
        message: &str,
        metadata: serde_json::Value,
    ) -> Result<(), StoreError>;
}

/// Sink that only records notifications in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(
        &self,
        user_id: &str,
        kind: &str,
        message: &str,
        metadata: serde_json::Value,
    ) -> Result<(), StoreError> {
        tracing::info!(user_id, kind, %metadata, "notification: {message}");
        Ok(())
    }
}
