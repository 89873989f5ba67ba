//! Bulk recompute: backfill and repair after rule changes.
//!
//! Each project is its own unit of work: milestones first (without
//! cascading), then the project once. A failing project is rolled back and
//! recorded; the batch continues.

use mp_core::enums::EntityType;
use mp_core::responses::{BulkRecomputeReport, ProjectRecomputeResult};

use super::{Cascade, StatusEngine};
use crate::error::StatusError;
use crate::store::{DeliveryStore, TemplateLookup};

impl<S> StatusEngine<S>
where
    S: DeliveryStore + TemplateLookup,
{
    /// Recompute every non-deleted project bottom-up.
    ///
    /// # Errors
    ///
    /// Only when the project list itself cannot be read; per-project failures
    /// are reported in the returned results.
    pub async fn recompute_all_projects(&self) -> Result<BulkRecomputeReport, StatusError> {
        let project_ids = self.store.list_project_ids().await?;
        tracing::info!(projects = project_ids.len(), "bulk recompute started");

        let mut results = Vec::with_capacity(project_ids.len());
        for project_id in project_ids {
            let result = match self.in_unit(self.recompute_project_tree(&project_id)).await {
                Ok(result) => result,
                Err(error) => {
                    tracing::warn!(%error, project_id, "bulk recompute failed for project");
                    ProjectRecomputeResult {
                        project_id,
                        success: false,
                        status: None,
                        milestones_changed: 0,
                        project_changed: false,
                        error: Some(error.to_string()),
                    }
                }
            };
            results.push(result);
        }

        let report = BulkRecomputeReport::from_results(results);
        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            writes = report.writes,
            "bulk recompute finished"
        );
        Ok(report)
    }

    async fn recompute_project_tree(
        &self,
        project_id: &str,
    ) -> Result<ProjectRecomputeResult, StatusError> {
        if self.store.get_project(project_id).await?.is_none() {
            return Err(StatusError::not_found(EntityType::Project, project_id));
        }

        let mut milestones_changed = 0u32;
        for milestone in self.store.list_milestones(project_id).await? {
            let outcome = self.recompute_milestone(&milestone.id, Cascade::None).await?;
            if outcome.changed {
                milestones_changed += 1;
            }
        }

        let project = self.recompute_project(project_id).await?;
        Ok(ProjectRecomputeResult {
            project_id: project_id.to_string(),
            success: true,
            status: Some(project.project.status),
            milestones_changed,
            project_changed: project.changed,
            error: None,
        })
    }
}
