//! Project aggregator: the terminal step of propagation.

use chrono::{DateTime, Utc};

use mp_core::audit_detail::StatusChangedDetail;
use mp_core::entities::Project;
use mp_core::enums::{AuditAction, EntityType, ProjectStatus};
use mp_core::rollup::derive_project_status;

use super::StatusEngine;
use super::milestone::status_detail;
use crate::error::StatusError;
use crate::store::{DeliveryStore, TemplateLookup};

#[derive(Debug, Clone)]
pub(crate) struct ProjectOutcome {
    pub project: Project,
    pub changed: bool,
}

impl<S> StatusEngine<S>
where
    S: DeliveryStore + TemplateLookup,
{
    /// Recompute a project from its normal milestones.
    ///
    /// # Errors
    ///
    /// `StatusError::NotFound` if the project does not exist; store errors otherwise.
    pub async fn update_project_status(&self, project_id: &str) -> Result<Project, StatusError> {
        self.in_unit(async { Ok(self.recompute_project(project_id).await?.project) })
            .await
    }

    /// Never re-descends into milestones.
    pub(crate) async fn recompute_project(
        &self,
        project_id: &str,
    ) -> Result<ProjectOutcome, StatusError> {
        let mut project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| StatusError::not_found(EntityType::Project, project_id))?;

        let milestones = self.store.list_milestones(project_id).await?;
        let derived = derive_project_status(
            milestones
                .iter()
                .map(|m| (m.name.as_str(), m.status.as_str())),
        );

        tracing::debug!(
            project_id,
            current = %project.status,
            %derived,
            milestones = milestones.len(),
            "project recompute"
        );

        if project.status == derived {
            return Ok(ProjectOutcome {
                project,
                changed: false,
            });
        }

        let previous = project.status;
        let now = self.now();
        stamp_project(&mut project, derived, now);
        self.store.save_project(&project).await?;
        self.store
            .append_audit(
                EntityType::Project,
                &project.id,
                AuditAction::StatusChanged,
                Some(status_detail(&StatusChangedDetail::rollup(
                    previous.as_str(),
                    derived.as_str(),
                ))?),
                now,
            )
            .await?;
        tracing::info!(project_id, from = %previous, to = %derived, "project status changed");

        Ok(ProjectOutcome {
            project,
            changed: true,
        })
    }
}

/// Apply `next` and its date side effects to `project`.
pub(crate) fn stamp_project(project: &mut Project, next: ProjectStatus, now: DateTime<Utc>) {
    if next == ProjectStatus::Open {
        project.actual_start_date = None;
    }
    if matches!(next, ProjectStatus::Open | ProjectStatus::InProgress) {
        project.actual_end_date = None;
    }
    if next == ProjectStatus::InProgress && project.actual_start_date.is_none() {
        project.actual_start_date = Some(now);
    }
    if next == ProjectStatus::Completed && project.actual_end_date.is_none() {
        project.actual_end_date = Some(now);
    }
    project.status = next;
    project.updated_at = now;
}
