//! Status propagation coordinator: task and ticket status entry points.
//!
//! A child status write triggers at most one milestone recompute, which in
//! turn triggers at most one project recompute. Setting a child to the status
//! it already has writes nothing and triggers nothing.

use chrono::{DateTime, Utc};

use mp_core::audit_detail::StatusChangedDetail;
use mp_core::entities::Notification;
use mp_core::enums::{AuditAction, EntityType, WorkStatus};
use mp_core::responses::{TaskStatusUpdate, TicketStatusUpdate};

use super::milestone::status_detail;
use super::{Cascade, StatusEngine, add_days};
use crate::error::{StatusError, StoreError};
use crate::store::{DeliveryStore, TemplateLookup};

/// A task that just transitioned into `Completed`, pending admin notification.
#[derive(Debug, Clone)]
pub(crate) struct CompletedTask {
    pub task_id: String,
    pub title: String,
    pub milestone_id: String,
    pub project_id: String,
    pub admin_ids: Vec<String>,
}

impl<S> StatusEngine<S>
where
    S: DeliveryStore + TemplateLookup,
{
    /// Set a task's status and propagate to its milestone and project.
    ///
    /// Returns the task plus the milestone/project only when they changed.
    /// Admins are notified after commit when the task becomes `Completed`.
    ///
    /// # Errors
    ///
    /// `Validation` for a status outside `Open|In Progress|Completed`,
    /// `NotFound` for a missing task or milestone, `Conflict` on write contention.
    pub async fn update_task_status(
        &self,
        task_id: &str,
        status: &str,
    ) -> Result<TaskStatusUpdate, StatusError> {
        let target = WorkStatus::parse_target(status, WorkStatus::TASK_TARGETS)?;
        let (update, completed) = self.in_unit(self.set_task_status(task_id, target)).await?;
        if let Some(completed) = completed {
            self.notify_task_completed(&completed).await;
        }
        Ok(update)
    }

    /// Set a ticket's status and propagate to its milestone (and project, for
    /// a ticket filed under a normal milestone).
    ///
    /// # Errors
    ///
    /// `Validation` for a status outside `Open|In Progress|Completed|Closed`,
    /// `NotFound` for a missing ticket or milestone, `Conflict` on write contention.
    pub async fn update_ticket_status(
        &self,
        ticket_id: &str,
        status: &str,
    ) -> Result<TicketStatusUpdate, StatusError> {
        let target = WorkStatus::parse_target(status, WorkStatus::TICKET_TARGETS)?;
        self.in_unit(self.set_ticket_status(ticket_id, target)).await
    }

    pub(crate) async fn set_task_status(
        &self,
        task_id: &str,
        target: WorkStatus,
    ) -> Result<(TaskStatusUpdate, Option<CompletedTask>), StatusError> {
        let mut task = self
            .store
            .get_task(task_id)
            .await?
            .ok_or_else(|| StatusError::not_found(EntityType::Task, task_id))?;

        let previous = WorkStatus::parse(&task.status);
        if previous == Some(target) {
            tracing::debug!(task_id, status = %target, "task status unchanged");
            let update = TaskStatusUpdate {
                task,
                milestone: None,
                project: None,
            };
            return Ok((update, None));
        }

        let previous_label = task.status.clone();
        let now = self.now();
        if target == WorkStatus::InProgress && task.start_date.is_none() {
            task.start_date = Some(now);
            if let Some(due) = self
                .task_estimate(&task.milestone_id, &task.title)
                .await
                .and_then(|days| add_days(now, days))
            {
                task.due_date = Some(due);
            }
        }
        task.status = target.as_str().to_string();
        task.updated_at = now;

        self.store.save_task(&task).await?;
        self.store
            .append_audit(
                EntityType::Task,
                task_id,
                AuditAction::StatusChanged,
                Some(status_detail(&StatusChangedDetail::manual(
                    &previous_label,
                    target.as_str(),
                ))?),
                now,
            )
            .await?;
        tracing::info!(task_id, from = %previous_label, to = %target, "task status changed");

        let outcome = self
            .recompute_milestone(&task.milestone_id, Cascade::Project)
            .await?;

        let completed = if previous != Some(WorkStatus::Completed)
            && target == WorkStatus::Completed
            && self.notify_admins_on_completion
        {
            Some(CompletedTask {
                task_id: task.id.clone(),
                title: task.title.clone(),
                milestone_id: task.milestone_id.clone(),
                project_id: outcome.milestone.project_id.clone(),
                admin_ids: self.admin_ids().await,
            })
        } else {
            None
        };

        let update = TaskStatusUpdate {
            milestone: outcome.changed_milestone(),
            project: outcome.changed_project(),
            task,
        };
        Ok((update, completed))
    }

    pub(crate) async fn set_ticket_status(
        &self,
        ticket_id: &str,
        target: WorkStatus,
    ) -> Result<TicketStatusUpdate, StatusError> {
        let mut ticket = self
            .store
            .get_ticket(ticket_id)
            .await?
            .ok_or_else(|| StatusError::not_found(EntityType::Ticket, ticket_id))?;

        if target.matches(&ticket.status) {
            tracing::debug!(ticket_id, status = %target, "ticket status unchanged");
            return Ok(TicketStatusUpdate {
                ticket,
                milestone: None,
                project: None,
            });
        }

        let previous_label = ticket.status.clone();
        let now = self.now();
        ticket.status = target.as_str().to_string();
        ticket.updated_at = now;

        self.store.save_ticket(&ticket).await?;
        self.store
            .append_audit(
                EntityType::Ticket,
                ticket_id,
                AuditAction::StatusChanged,
                Some(status_detail(&StatusChangedDetail::manual(
                    &previous_label,
                    target.as_str(),
                ))?),
                now,
            )
            .await?;
        tracing::info!(ticket_id, from = %previous_label, to = %target, "ticket status changed");

        let outcome = self
            .recompute_milestone(&ticket.milestone_id, Cascade::Project)
            .await?;

        Ok(TicketStatusUpdate {
            milestone: outcome.changed_milestone(),
            project: outcome.changed_project(),
            ticket,
        })
    }

    /// Template duration for a task in `milestone_id`; any failure degrades to `None`.
    pub(crate) async fn task_estimate(&self, milestone_id: &str, title: &str) -> Option<i64> {
        match self.lookup_task_estimate(milestone_id, title).await {
            Ok(days) => days,
            Err(error) => {
                tracing::warn!(%error, milestone_id, title, "template task lookup failed");
                None
            }
        }
    }

    async fn lookup_task_estimate(
        &self,
        milestone_id: &str,
        title: &str,
    ) -> Result<Option<i64>, StoreError> {
        let Some(milestone) = self.store.get_milestone(milestone_id).await? else {
            return Ok(None);
        };
        let Some(project) = self.store.get_project(&milestone.project_id).await? else {
            return Ok(None);
        };
        let Some(template_id) = project.template_id else {
            return Ok(None);
        };
        self.store
            .task_estimated_days(&template_id, &milestone.name, title)
            .await
    }

    async fn admin_ids(&self) -> Vec<String> {
        match self.store.list_admin_user_ids().await {
            Ok(ids) => ids,
            Err(error) => {
                tracing::warn!(%error, "admin lookup failed; skipping completion notifications");
                Vec::new()
            }
        }
    }

    async fn notify_task_completed(&self, completed: &CompletedTask) {
        let message = format!("Task '{}' was completed", completed.title);
        let metadata = serde_json::json!({
            "task_id": completed.task_id,
            "milestone_id": completed.milestone_id,
            "project_id": completed.project_id,
        });
        for user_id in &completed.admin_ids {
            if let Err(error) = self
                .notifier
                .notify(
                    user_id,
                    Notification::KIND_TASK_COMPLETED,
                    &message,
                    metadata.clone(),
                )
                .await
            {
                tracing::warn!(%error, user_id, task_id = %completed.task_id, "notification delivery failed");
            }
        }
    }
}

/// Initial dates for a task created directly in `status`.
pub(crate) fn initial_task_dates(
    status: WorkStatus,
    now: DateTime<Utc>,
    estimated_days: Option<i64>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    if status == WorkStatus::InProgress {
        (Some(now), estimated_days.and_then(|days| add_days(now, days)))
    } else {
        (None, None)
    }
}
