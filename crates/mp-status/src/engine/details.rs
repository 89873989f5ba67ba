//! Read-only status snapshot of a project tree.

use mp_core::enums::EntityType;
use mp_core::responses::{MilestoneStatusDetail, ProjectStatusDetails, ProjectSummary, TaskSummary};

use super::StatusEngine;
use crate::error::StatusError;
use crate::store::{DeliveryStore, TemplateLookup};

impl<S> StatusEngine<S>
where
    S: DeliveryStore + TemplateLookup,
{
    /// Stored statuses of a project, its milestones, and their tasks.
    ///
    /// Nothing is recomputed or written.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing project; store errors otherwise.
    pub async fn get_project_status_details(
        &self,
        project_id: &str,
    ) -> Result<ProjectStatusDetails, StatusError> {
        let project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| StatusError::not_found(EntityType::Project, project_id))?;

        let mut milestones = Vec::new();
        for milestone in self.store.list_milestones(project_id).await? {
            let tasks = self
                .store
                .list_tasks(&milestone.id)
                .await?
                .into_iter()
                .map(|t| TaskSummary {
                    id: t.id,
                    title: t.title,
                    status: t.status,
                })
                .collect();
            milestones.push(MilestoneStatusDetail {
                id: milestone.id,
                name: milestone.name,
                status: milestone.status,
                start_date: milestone.start_date,
                end_date: milestone.end_date,
                tasks,
            });
        }

        Ok(ProjectStatusDetails {
            project: ProjectSummary {
                id: project.id,
                name: project.name,
                status: project.status,
            },
            milestones,
        })
    }
}
