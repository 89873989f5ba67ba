//! Task repository: insert, status/date saves, soft delete.

use chrono::{DateTime, Utc};

use mp_core::entities::Task;
use mp_core::ids::PREFIX_TASK;
use mp_status::store::NewTask;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_datetime, opt_rfc3339, parse_datetime};
use crate::store::SqlStore;

const SELECT_COLS: &str =
    "id, milestone_id, title, status, start_date, due_date, deleted, created_at, updated_at";

fn row_to_task(row: &libsql::Row) -> Result<Task, DatabaseError> {
    Ok(Task {
        id: row.get(0)?,
        milestone_id: row.get(1)?,
        title: row.get(2)?,
        status: row.get(3)?,
        start_date: get_opt_datetime(row, 4)?,
        due_date: get_opt_datetime(row, 5)?,
        deleted: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl SqlStore {
    pub async fn insert_task(
        &self,
        new: &NewTask,
        now: DateTime<Utc>,
    ) -> Result<Task, DatabaseError> {
        let id = self.db().generate_id(PREFIX_TASK).await?;
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO tasks ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    new.milestone_id.as_str(),
                    new.title.as_str(),
                    new.status.as_str(),
                    opt_rfc3339(new.start_date),
                    opt_rfc3339(new.due_date),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Task {
            id,
            milestone_id: new.milestone_id.clone(),
            title: new.title.clone(),
            status: new.status.as_str().to_string(),
            start_date: new.start_date,
            due_date: new.due_date,
            deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM tasks WHERE id = ?1 AND deleted = 0"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_task(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_tasks(&self, milestone_id: &str) -> Result<Vec<Task>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM tasks
                     WHERE milestone_id = ?1 AND deleted = 0
                     ORDER BY rowid"
                ),
                [milestone_id],
            )
            .await?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    pub async fn save_task(&self, task: &Task) -> Result<(), DatabaseError> {
        let changed = self
            .conn()
            .execute(
                "UPDATE tasks SET status = ?1, start_date = ?2, due_date = ?3, updated_at = ?4
                 WHERE id = ?5",
                libsql::params![
                    task.status.as_str(),
                    opt_rfc3339(task.start_date),
                    opt_rfc3339(task.due_date),
                    task.updated_at.to_rfc3339(),
                    task.id.as_str()
                ],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    /// Soft delete: the row stays for audit but drops out of every read.
    pub async fn delete_task(&self, id: &str, now: DateTime<Utc>) -> Result<(), DatabaseError> {
        let changed = self
            .conn()
            .execute(
                "UPDATE tasks SET deleted = 1, updated_at = ?1 WHERE id = ?2 AND deleted = 0",
                libsql::params![now.to_rfc3339(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }
}
