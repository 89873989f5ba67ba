//! Project repository.

use chrono::{DateTime, Utc};

use mp_core::entities::Project;
use mp_core::enums::ProjectStatus;
use mp_core::ids::PREFIX_PROJECT;
use mp_status::store::NewProject;

use crate::error::DatabaseError;
use crate::helpers::{
    get_bool, get_opt_datetime, get_opt_string, opt_rfc3339, parse_datetime, parse_project_status,
};
use crate::store::SqlStore;

const SELECT_COLS: &str = "id, name, status, template_id, actual_start_date, actual_end_date, \
                           deleted, created_at, updated_at";

fn row_to_project(row: &libsql::Row) -> Result<Project, DatabaseError> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        status: parse_project_status(&row.get::<String>(2)?)?,
        template_id: get_opt_string(row, 3)?,
        actual_start_date: get_opt_datetime(row, 4)?,
        actual_end_date: get_opt_datetime(row, 5)?,
        deleted: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl SqlStore {
    pub async fn insert_project(
        &self,
        new: &NewProject,
        now: DateTime<Utc>,
    ) -> Result<Project, DatabaseError> {
        let id = self.db().generate_id(PREFIX_PROJECT).await?;
        self.conn()
            .execute(
                &format!("INSERT INTO projects ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, NULL, NULL, 0, ?5, ?6)"),
                libsql::params![
                    id.as_str(),
                    new.name.as_str(),
                    ProjectStatus::Open.as_str(),
                    new.template_id.as_deref(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Project {
            id,
            name: new.name.clone(),
            status: ProjectStatus::Open,
            template_id: new.template_id.clone(),
            actual_start_date: None,
            actual_end_date: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_project(&self, id: &str) -> Result<Option<Project>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM projects WHERE id = ?1 AND deleted = 0"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_project(&row)?)),
            None => Ok(None),
        }
    }

    /// Non-deleted projects, oldest first.
    pub async fn list_projects(&self, limit: u32) -> Result<Vec<Project>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM projects WHERE deleted = 0
                     ORDER BY rowid LIMIT ?1"
                ),
                [i64::from(limit)],
            )
            .await?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next().await? {
            projects.push(row_to_project(&row)?);
        }
        Ok(projects)
    }

    pub async fn list_project_ids(&self) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id FROM projects WHERE deleted = 0 ORDER BY rowid",
                (),
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }

    pub async fn save_project(&self, project: &Project) -> Result<(), DatabaseError> {
        let changed = self
            .conn()
            .execute(
                "UPDATE projects
                 SET status = ?1, actual_start_date = ?2, actual_end_date = ?3, updated_at = ?4
                 WHERE id = ?5",
                libsql::params![
                    project.status.as_str(),
                    opt_rfc3339(project.actual_start_date),
                    opt_rfc3339(project.actual_end_date),
                    project.updated_at.to_rfc3339(),
                    project.id.as_str()
                ],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use mp_core::enums::ProjectStatus;

    use crate::test_support::helpers::{seed_project, test_store};

    #[tokio::test]
    async fn insert_and_get_roundtrip() {
        let store = test_store().await;
        let project = seed_project(&store, "Website relaunch").await;
        assert!(project.id.starts_with("prj-"));

        let fetched = store.get_project(&project.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Website relaunch");
        assert_eq!(fetched.status, ProjectStatus::Open);
        assert_eq!(fetched.actual_start_date, None);
    }

    #[tokio::test]
    async fn save_persists_status_and_dates() {
        let store = test_store().await;
        let mut project = seed_project(&store, "Mobile app").await;
        let started = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        project.status = ProjectStatus::InProgress;
        project.actual_start_date = Some(started);
        project.updated_at = started;
        store.save_project(&project).await.unwrap();

        let fetched = store.get_project(&project.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ProjectStatus::InProgress);
        assert_eq!(fetched.actual_start_date, Some(started));
    }

    #[tokio::test]
    async fn deleted_projects_are_hidden() {
        let store = test_store().await;
        let kept = seed_project(&store, "Kept").await;
        let gone = seed_project(&store, "Gone").await;
        store
            .conn()
            .execute("UPDATE projects SET deleted = 1 WHERE id = ?1", [gone.id.as_str()])
            .await
            .unwrap();

        assert!(store.get_project(&gone.id).await.unwrap().is_none());
        assert_eq!(store.list_project_ids().await.unwrap(), vec![kept.id.clone()]);
        assert_eq!(store.list_projects(10).await.unwrap().len(), 1);
    }
}
