//! Milestone aggregator.
//!
//! Normal milestones roll up from their tasks, the Support milestone from its
//! tickets. Date side effects apply only when the derived status differs from
//! the stored one; an unchanged milestone is never written, which is what
//! stops propagation.

use chrono::{DateTime, Utc};

use mp_core::audit_detail::StatusChangedDetail;
use mp_core::entities::{Milestone, Project};
use mp_core::enums::{AuditAction, EntityType, WorkStatus};
use mp_core::rollup::{MilestoneKind, derive_milestone_status};

use super::project::ProjectOutcome;
use super::{Cascade, StatusEngine, add_days};
use crate::error::StatusError;
use crate::store::{DeliveryStore, TemplateLookup};

/// Result of one milestone recompute.
#[derive(Debug, Clone)]
pub(crate) struct MilestoneOutcome {
    pub milestone: Milestone,
    pub changed: bool,
    /// Present when the change cascaded to the project.
    pub project: Option<ProjectOutcome>,
}

impl MilestoneOutcome {
    /// The milestone, if it was rewritten.
    pub fn changed_milestone(&self) -> Option<Milestone> {
        self.changed.then(|| self.milestone.clone())
    }

    /// The project, if the cascade rewrote it.
    pub fn changed_project(&self) -> Option<Project> {
        self.project
            .as_ref()
            .filter(|p| p.changed)
            .map(|p| p.project.clone())
    }
}

impl<S> StatusEngine<S>
where
    S: DeliveryStore + TemplateLookup,
{
    /// Recompute a milestone from its children, cascading to its project on change.
    ///
    /// # Errors
    ///
    /// `StatusError::NotFound` if the milestone does not exist; store errors
    /// otherwise. Template lookup failures are logged, not returned.
    pub async fn update_milestone_status(&self, milestone_id: &str) -> Result<Milestone, StatusError> {
        self.in_unit(async {
            let outcome = self.recompute_milestone(milestone_id, Cascade::Project).await?;
            Ok(outcome.milestone)
        })
        .await
    }

    pub(crate) async fn recompute_milestone(
        &self,
        milestone_id: &str,
        cascade: Cascade,
    ) -> Result<MilestoneOutcome, StatusError> {
        let mut milestone = self
            .store
            .get_milestone(milestone_id)
            .await?
            .ok_or_else(|| StatusError::not_found(EntityType::Milestone, milestone_id))?;

        let derived = match milestone.kind() {
            MilestoneKind::Normal => {
                let tasks = self.store.list_tasks(milestone_id).await?;
                derive_milestone_status(MilestoneKind::Normal, tasks.iter().map(|t| &t.status))
            }
            MilestoneKind::Support => {
                let tickets = self.store.list_tickets(milestone_id).await?;
                derive_milestone_status(MilestoneKind::Support, tickets.iter().map(|t| &t.status))
            }
        };

        tracing::debug!(
            milestone_id,
            current = %milestone.status,
            %derived,
            "milestone recompute"
        );

        if derived.matches(&milestone.status) {
            return Ok(MilestoneOutcome {
                milestone,
                changed: false,
                project: None,
            });
        }

        let previous = milestone.status.clone();
        let now = self.now();
        let estimated_days = if derived == WorkStatus::InProgress && milestone.start_date.is_none() {
            self.milestone_estimate(&milestone).await
        } else {
            None
        };

        stamp_milestone(&mut milestone, derived, now, estimated_days);
        self.store.save_milestone(&milestone).await?;
        self.store
            .append_audit(
                EntityType::Milestone,
                &milestone.id,
                AuditAction::StatusChanged,
                Some(status_detail(&StatusChangedDetail::rollup(
                    &previous,
                    derived.as_str(),
                ))?),
                now,
            )
            .await?;
        tracing::info!(
            milestone_id,
            from = %previous,
            to = %derived,
            "milestone status changed"
        );

        let project = match cascade {
            Cascade::Project => Some(self.recompute_project(&milestone.project_id).await?),
            Cascade::None => None,
        };

        Ok(MilestoneOutcome {
            milestone,
            changed: true,
            project,
        })
    }

    /// Template duration for this milestone; any failure degrades to `None`.
    async fn milestone_estimate(&self, milestone: &Milestone) -> Option<i64> {
        let template_id = match self.store.get_project(&milestone.project_id).await {
            Ok(Some(project)) => project.template_id?,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(%error, milestone_id = %milestone.id, "project lookup for template failed");
                return None;
            }
        };
        match self
            .store
            .milestone_estimated_days(&template_id, &milestone.name)
            .await
        {
            Ok(days) => days,
            Err(error) => {
                tracing::warn!(%error, milestone_id = %milestone.id, "template milestone lookup failed");
                None
            }
        }
    }
}

/// Apply `next` and its date side effects to `milestone`.
pub(crate) fn stamp_milestone(
    milestone: &mut Milestone,
    next: WorkStatus,
    now: DateTime<Utc>,
    estimated_days: Option<i64>,
) {
    if matches!(next, WorkStatus::Open | WorkStatus::InProgress) {
        milestone.actual_date = None;
        milestone.estimated_date = None;
    }
    if next == WorkStatus::InProgress && milestone.start_date.is_none() {
        milestone.start_date = Some(now);
        if let Some(end) = estimated_days.and_then(|days| add_days(now, days)) {
            milestone.end_date = Some(end);
        }
    }
    if next == WorkStatus::Completed {
        milestone.actual_date = Some(now);
    }
    milestone.status = next.as_str().to_string();
    milestone.updated_at = now;
}

pub(crate) fn status_detail(
    detail: &StatusChangedDetail,
) -> Result<serde_json::Value, StatusError> {
    serde_json::to_value(detail).map_err(|e| StatusError::Store(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn milestone(status: &str) -> Milestone {
        let created = Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap();
        Milestone {
            id: "mst-1".into(),
            project_id: "prj-1".into(),
            name: "Setup".into(),
            status: status.into(),
            start_date: None,
            end_date: None,
            actual_date: None,
            estimated_date: None,
            deleted: false,
            created_at: created,
            updated_at: created,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn in_progress_sets_start_and_estimated_end() {
        let mut m = milestone("Open");
        stamp_milestone(&mut m, WorkStatus::InProgress, now(), Some(5));
        assert_eq!(m.status, "In Progress");
        assert_eq!(m.start_date, Some(now()));
        assert_eq!(m.end_date, Some(now() + Duration::days(5)));
    }

    #[test]
    fn in_progress_keeps_existing_start() {
        let mut m = milestone("Completed");
        let earlier = now() - Duration::days(10);
        m.start_date = Some(earlier);
        m.actual_date = Some(earlier);
        stamp_milestone(&mut m, WorkStatus::InProgress, now(), Some(5));
        assert_eq!(m.start_date, Some(earlier));
        assert_eq!(m.end_date, None);
        assert_eq!(m.actual_date, None);
    }

    #[test]
    fn completed_sets_actual_date() {
        let mut m = milestone("In Progress");
        m.estimated_date = Some(now());
        stamp_milestone(&mut m, WorkStatus::Completed, now(), None);
        assert_eq!(m.actual_date, Some(now()));
        assert_eq!(m.estimated_date, Some(now()));
    }

    #[test]
    fn status_detail_serializes_from_to_reason() {
        let detail = status_detail(&StatusChangedDetail::rollup("Open", "In Progress")).unwrap();
        assert_eq!(
            detail,
            serde_json::json!({"from": "Open", "to": "In Progress", "reason": "rollup"})
        );
        let back: StatusChangedDetail = serde_json::from_value(detail).unwrap();
        assert_eq!(back, StatusChangedDetail::rollup("Open", "In Progress"));
    }

    #[test]
    fn open_clears_actual_and_estimated() {
        let mut m = milestone("Completed");
        m.actual_date = Some(now());
        m.estimated_date = Some(now());
        stamp_milestone(&mut m, WorkStatus::Open, now(), None);
        assert_eq!(m.actual_date, None);
        assert_eq!(m.estimated_date, None);
        assert_eq!(m.start_date, None);
    }
}
