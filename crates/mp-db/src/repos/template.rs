//! Delivery template repository and estimated-duration lookup.
//!
//! Template milestones match a project milestone by name, template tasks
//! match by (milestone name, task title). Both comparisons trim and ignore
//! ASCII case.

use chrono::Utc;

use mp_core::entities::{Template, TemplateMilestone, TemplateTask};
use mp_core::ids::{PREFIX_TEMPLATE, PREFIX_TEMPLATE_MILESTONE, PREFIX_TEMPLATE_TASK};

use crate::error::DatabaseError;
use crate::helpers::parse_datetime;
use crate::store::SqlStore;

impl SqlStore {
    pub async fn create_template(&self, name: &str) -> Result<Template, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_TEMPLATE).await?;
        self.conn()
            .execute(
                "INSERT INTO templates (id, name, created_at) VALUES (?1, ?2, ?3)",
                libsql::params![id.as_str(), name, now.to_rfc3339()],
            )
            .await?;
        Ok(Template {
            id,
            name: name.to_string(),
            created_at: now,
        })
    }

    pub async fn get_template(&self, id: &str) -> Result<Option<Template>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT id, name, created_at FROM templates WHERE id = ?1", [id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Template {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: parse_datetime(&row.get::<String>(2)?)?,
            })),
            None => Ok(None),
        }
    }

    pub async fn add_template_milestone(
        &self,
        template_id: &str,
        name: &str,
        estimated_days: i64,
    ) -> Result<TemplateMilestone, DatabaseError> {
        let id = self.db().generate_id(PREFIX_TEMPLATE_MILESTONE).await?;
        self.conn()
            .execute(
                "INSERT INTO template_milestones (id, template_id, name, estimated_days)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![id.as_str(), template_id, name, estimated_days],
            )
            .await?;
        Ok(TemplateMilestone {
            id,
            template_id: template_id.to_string(),
            name: name.to_string(),
            estimated_days,
        })
    }

    pub async fn add_template_task(
        &self,
        template_milestone_id: &str,
        title: &str,
        estimated_days: i64,
    ) -> Result<TemplateTask, DatabaseError> {
        let id = self.db().generate_id(PREFIX_TEMPLATE_TASK).await?;
        self.conn()
            .execute(
                "INSERT INTO template_tasks (id, template_milestone_id, title, estimated_days)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![id.as_str(), template_milestone_id, title, estimated_days],
            )
            .await?;
        Ok(TemplateTask {
            id,
            template_milestone_id: template_milestone_id.to_string(),
            title: title.to_string(),
            estimated_days,
        })
    }

    pub async fn milestone_estimated_days(
        &self,
        template_id: &str,
        milestone_name: &str,
    ) -> Result<Option<i64>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT estimated_days FROM template_milestones
                 WHERE template_id = ?1 AND lower(trim(name)) = lower(trim(?2))
                 ORDER BY rowid LIMIT 1",
                libsql::params![template_id, milestone_name],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<i64>(0)?)),
            None => Ok(None),
        }
    }

    pub async fn task_estimated_days(
        &self,
        template_id: &str,
        milestone_name: &str,
        task_title: &str,
    ) -> Result<Option<i64>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT tt.estimated_days FROM template_tasks tt
                 JOIN template_milestones tm ON tm.id = tt.template_milestone_id
                 WHERE tm.template_id = ?1
                   AND lower(trim(tm.name)) = lower(trim(?2))
                   AND lower(trim(tt.title)) = lower(trim(?3))
                 ORDER BY tt.rowid LIMIT 1",
                libsql::params![template_id, milestone_name, task_title],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<i64>(0)?)),
            None => Ok(None),
        }
    }
}
