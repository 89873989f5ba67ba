//! Creation and soft deletion of tree nodes.
//!
//! Adding or removing a child changes what its parent rolls up from, so each
//! operation ends with the same recompute a status change would trigger.

use mp_core::entities::{Milestone, Project};
use mp_core::enums::{AuditAction, EntityType, WorkStatus};
use mp_core::responses::{TaskStatusUpdate, TicketStatusUpdate};
use mp_core::rollup::MilestoneKind;

use super::coordinator::initial_task_dates;
use super::{Cascade, StatusEngine};
use crate::error::StatusError;
use crate::store::{DeliveryStore, NewMilestone, NewProject, NewTask, NewTicket, TemplateLookup};

fn require_name(value: &str, what: &str) -> Result<String, StatusError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StatusError::Validation(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}

impl<S> StatusEngine<S>
where
    S: DeliveryStore + TemplateLookup,
{
    /// Create a project together with its Support milestone.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty name; store errors otherwise.
    pub async fn create_project(
        &self,
        name: &str,
        template_id: Option<&str>,
    ) -> Result<Project, StatusError> {
        let new = NewProject {
            name: require_name(name, "project name")?,
            template_id: template_id.map(String::from),
        };
        self.in_unit(async {
            let now = self.now();
            let project = self.store.insert_project(&new, now).await?;
            self.store
                .append_audit(EntityType::Project, &project.id, AuditAction::Created, None, now)
                .await?;

            let support = self
                .store
                .insert_milestone(
                    &NewMilestone {
                        project_id: project.id.clone(),
                        name: MilestoneKind::SUPPORT_NAME.to_string(),
                    },
                    now,
                )
                .await?;
            self.store
                .append_audit(EntityType::Milestone, &support.id, AuditAction::Created, None, now)
                .await?;

            tracing::info!(project_id = %project.id, support_id = %support.id, "project created");
            Ok(project)
        })
        .await
    }

    /// Add a milestone to a project and recompute the project.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing project, `Validation` for an empty name or a
    /// second Support milestone.
    pub async fn create_milestone(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<Milestone, StatusError> {
        let name = require_name(name, "milestone name")?;
        self.in_unit(async {
            if self.store.get_project(project_id).await?.is_none() {
                return Err(StatusError::not_found(EntityType::Project, project_id));
            }
            if MilestoneKind::from_name(&name) == MilestoneKind::Support {
                let existing = self.store.list_milestones(project_id).await?;
                if existing.iter().any(Milestone::is_support) {
                    return Err(StatusError::Validation(format!(
                        "project {project_id} already has a Support milestone"
                    )));
                }
            }

            let now = self.now();
            let milestone = self
                .store
                .insert_milestone(
                    &NewMilestone {
                        project_id: project_id.to_string(),
                        name: name.clone(),
                    },
                    now,
                )
                .await?;
            self.store
                .append_audit(EntityType::Milestone, &milestone.id, AuditAction::Created, None, now)
                .await?;
            self.recompute_project(project_id).await?;
            Ok(milestone)
        })
        .await
    }

    /// Add a task (default `Open`) and propagate.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing milestone, `Validation` for an empty title or
    /// a status tasks may not take.
    pub async fn create_task(
        &self,
        milestone_id: &str,
        title: &str,
        status: Option<&str>,
    ) -> Result<TaskStatusUpdate, StatusError> {
        let title = require_name(title, "task title")?;
        let status = match status {
            Some(label) => WorkStatus::parse_target(label, WorkStatus::TASK_TARGETS)?,
            None => WorkStatus::Open,
        };
        self.in_unit(async {
            if self.store.get_milestone(milestone_id).await?.is_none() {
                return Err(StatusError::not_found(EntityType::Milestone, milestone_id));
            }

            let now = self.now();
            let estimate = if status == WorkStatus::InProgress {
                self.task_estimate(milestone_id, &title).await
            } else {
                None
            };
            let (start_date, due_date) = initial_task_dates(status, now, estimate);
            let task = self
                .store
                .insert_task(
                    &NewTask {
                        milestone_id: milestone_id.to_string(),
                        title: title.clone(),
                        status,
                        start_date,
                        due_date,
                    },
                    now,
                )
                .await?;
            self.store
                .append_audit(EntityType::Task, &task.id, AuditAction::Created, None, now)
                .await?;

            let outcome = self.recompute_milestone(milestone_id, Cascade::Project).await?;
            Ok(TaskStatusUpdate {
                milestone: outcome.changed_milestone(),
                project: outcome.changed_project(),
                task,
            })
        })
        .await
    }

    /// Raise a ticket (default `Open`) and propagate.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing milestone or linked task, `Validation` for an
    /// empty title or unknown status.
    pub async fn create_ticket(
        &self,
        milestone_id: &str,
        task_id: Option<&str>,
        title: &str,
        status: Option<&str>,
    ) -> Result<TicketStatusUpdate, StatusError> {
        let title = require_name(title, "ticket title")?;
        let status = match status {
            Some(label) => WorkStatus::parse_target(label, WorkStatus::TICKET_TARGETS)?,
            None => WorkStatus::Open,
        };
        self.in_unit(async {
            if self.store.get_milestone(milestone_id).await?.is_none() {
                return Err(StatusError::not_found(EntityType::Milestone, milestone_id));
            }
            if let Some(task_id) = task_id {
                if self.store.get_task(task_id).await?.is_none() {
                    return Err(StatusError::not_found(EntityType::Task, task_id));
                }
            }

            let now = self.now();
            let ticket = self
                .store
                .insert_ticket(
                    &NewTicket {
                        milestone_id: milestone_id.to_string(),
                        task_id: task_id.map(String::from),
                        title: title.clone(),
                        status,
                    },
                    now,
                )
                .await?;
            self.store
                .append_audit(EntityType::Ticket, &ticket.id, AuditAction::Created, None, now)
                .await?;

            let outcome = self.recompute_milestone(milestone_id, Cascade::Project).await?;
            Ok(TicketStatusUpdate {
                milestone: outcome.changed_milestone(),
                project: outcome.changed_project(),
                ticket,
            })
        })
        .await
    }

    /// Soft-delete a task and propagate.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing (or already deleted) task.
    pub async fn delete_task(&self, task_id: &str) -> Result<TaskStatusUpdate, StatusError> {
        self.in_unit(async {
            let mut task = self
                .store
                .get_task(task_id)
                .await?
                .ok_or_else(|| StatusError::not_found(EntityType::Task, task_id))?;
            let now = self.now();
            self.store.delete_task(task_id, now).await?;
            self.store
                .append_audit(EntityType::Task, task_id, AuditAction::Deleted, None, now)
                .await?;
            task.deleted = true;
            task.updated_at = now;

            let outcome = self
                .recompute_milestone(&task.milestone_id, Cascade::Project)
                .await?;
            Ok(TaskStatusUpdate {
                milestone: outcome.changed_milestone(),
                project: outcome.changed_project(),
                task,
            })
        })
        .await
    }

    /// Soft-delete a ticket and propagate.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing (or already deleted) ticket.
    pub async fn delete_ticket(&self, ticket_id: &str) -> Result<TicketStatusUpdate, StatusError> {
        self.in_unit(async {
            let mut ticket = self
                .store
                .get_ticket(ticket_id)
                .await?
                .ok_or_else(|| StatusError::not_found(EntityType::Ticket, ticket_id))?;
            let now = self.now();
            self.store.delete_ticket(ticket_id, now).await?;
            self.store
                .append_audit(EntityType::Ticket, ticket_id, AuditAction::Deleted, None, now)
                .await?;
            ticket.deleted = true;
            ticket.updated_at = now;

            let outcome = self
                .recompute_milestone(&ticket.milestone_id, Cascade::Project)
                .await?;
            Ok(TicketStatusUpdate {
                milestone: outcome.changed_milestone(),
                project: outcome.changed_project(),
                ticket,
            })
        })
        .await
    }
}
