//! Milestone repository.

use chrono::{DateTime, Utc};

use mp_core::entities::Milestone;
use mp_core::enums::WorkStatus;
use mp_core::ids::PREFIX_MILESTONE;
use mp_status::store::NewMilestone;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_datetime, opt_rfc3339, parse_datetime};
use crate::store::SqlStore;

const SELECT_COLS: &str = "id, project_id, name, status, start_date, end_date, actual_date, \
                           estimated_date, deleted, created_at, updated_at";

fn row_to_milestone(row: &libsql::Row) -> Result<Milestone, DatabaseError> {
    Ok(Milestone {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        status: row.get(3)?,
        start_date: get_opt_datetime(row, 4)?,
        end_date: get_opt_datetime(row, 5)?,
        actual_date: get_opt_datetime(row, 6)?,
        estimated_date: get_opt_datetime(row, 7)?,
        deleted: get_bool(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

impl SqlStore {
    pub async fn insert_milestone(
        &self,
        new: &NewMilestone,
        now: DateTime<Utc>,
    ) -> Result<Milestone, DatabaseError> {
        let id = self.db().generate_id(PREFIX_MILESTONE).await?;
        let status = WorkStatus::Open.as_str();
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO milestones ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, NULL, NULL, NULL, NULL, 0, ?5, ?6)"
                ),
                libsql::params![
                    id.as_str(),
                    new.project_id.as_str(),
                    new.name.as_str(),
                    status,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Milestone {
            id,
            project_id: new.project_id.clone(),
            name: new.name.clone(),
            status: status.to_string(),
            start_date: None,
            end_date: None,
            actual_date: None,
            estimated_date: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_milestone(&self, id: &str) -> Result<Option<Milestone>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM milestones WHERE id = ?1 AND deleted = 0"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_milestone(&row)?)),
            None => Ok(None),
        }
    }

    /// Non-deleted milestones of a project in creation order.
    pub async fn list_milestones(&self, project_id: &str) -> Result<Vec<Milestone>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM milestones
                     WHERE project_id = ?1 AND deleted = 0
                     ORDER BY rowid"
                ),
                [project_id],
            )
            .await?;
        let mut milestones = Vec::new();
        while let Some(row) = rows.next().await? {
            milestones.push(row_to_milestone(&row)?);
        }
        Ok(milestones)
    }

    pub async fn save_milestone(&self, milestone: &Milestone) -> Result<(), DatabaseError> {
        let changed = self
            .conn()
            .execute(
                "UPDATE milestones
                 SET status = ?1, start_date = ?2, end_date = ?3, actual_date = ?4,
                     estimated_date = ?5, updated_at = ?6
                 WHERE id = ?7",
                libsql::params![
                    milestone.status.as_str(),
                    opt_rfc3339(milestone.start_date),
                    opt_rfc3339(milestone.end_date),
                    opt_rfc3339(milestone.actual_date),
                    opt_rfc3339(milestone.estimated_date),
                    milestone.updated_at.to_rfc3339(),
                    milestone.id.as_str()
                ],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }
}
