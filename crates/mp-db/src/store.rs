//! `SqlStore`: the libSQL implementation of the engine ports.
//!
//! Entity SQL lives in `repos/*` as `impl SqlStore` blocks returning
//! [`DatabaseError`]. This module only adapts them to the `mp-status` traits
//! and owns the transaction bracket.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mp_core::entities::{Milestone, Project, Task, Ticket};
use mp_core::enums::{AuditAction, EntityType};
use mp_status::StoreError;
use mp_status::store::{
    DeliveryStore, NewMilestone, NewProject, NewTask, NewTicket, NotificationSink, TemplateLookup,
};
use mp_status::unit::UnitGate;

use crate::DeliveryDb;
use crate::error::DatabaseError;

/// Shared handle over one [`DeliveryDb`].
///
/// Clones share the connection and a [`UnitGate`]: `begin` holds the gate
/// until `commit` succeeds or `rollback` runs, so units started from
/// concurrent tasks queue instead of nesting `BEGIN` on the one connection.
/// Reads outside a unit are not gated and may observe an open unit's writes.
#[derive(Clone)]
pub struct SqlStore {
    db: Arc<DeliveryDb>,
    unit: UnitGate,
}

impl SqlStore {
    #[must_use]
    pub fn new(db: DeliveryDb) -> Self {
        Self {
            db: Arc::new(db),
            unit: UnitGate::new(),
        }
    }

    /// Open (and migrate) a local database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn open_local(path: &str, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        Ok(Self::new(DeliveryDb::open_local(path, busy_timeout).await?))
    }

    #[must_use]
    pub fn db(&self) -> &DeliveryDb {
        &self.db
    }

    pub(crate) fn conn(&self) -> &libsql::Connection {
        self.db.conn()
    }

    async fn run_control(&self, sql: &str) -> Result<(), StoreError> {
        self.conn()
            .execute(sql, ())
            .await
            .map_err(DatabaseError::from)?;
        Ok(())
    }
}

#[async_trait]
impl DeliveryStore for SqlStore {
    async fn begin(&self) -> Result<(), StoreError> {
        self.unit.enter().await;
        // Write lock up front; a competing writer waits busy_timeout, then conflicts
        if let Err(error) = self.run_control("BEGIN IMMEDIATE").await {
            self.unit.leave().await;
            return Err(error);
        }
        Ok(())
    }

    async fn commit(&self) -> Result<(), StoreError> {
        // On failure the transaction stays open until rollback
        self.run_control("COMMIT").await?;
        self.unit.leave().await;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), StoreError> {
        let result = self.run_control("ROLLBACK").await;
        self.unit.leave().await;
        result
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        Ok(Self::get_project(self, id).await?)
    }

    async fn list_project_ids(&self) -> Result<Vec<String>, StoreError> {
        Ok(Self::list_project_ids(self).await?)
    }

    async fn insert_project(
        &self,
        new: &NewProject,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError> {
        Ok(Self::insert_project(self, new, now).await?)
    }

    async fn save_project(&self, project: &Project) -> Result<(), StoreError> {
        Ok(Self::save_project(self, project).await?)
    }

    async fn get_milestone(&self, id: &str) -> Result<Option<Milestone>, StoreError> {
        Ok(Self::get_milestone(self, id).await?)
    }

    async fn list_milestones(&self, project_id: &str) -> Result<Vec<Milestone>, StoreError> {
        Ok(Self::list_milestones(self, project_id).await?)
    }

    async fn insert_milestone(
        &self,
        new: &NewMilestone,
        now: DateTime<Utc>,
    ) -> Result<Milestone, StoreError> {
        Ok(Self::insert_milestone(self, new, now).await?)
    }

    async fn save_milestone(&self, milestone: &Milestone) -> Result<(), StoreError> {
        Ok(Self::save_milestone(self, milestone).await?)
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        Ok(Self::get_task(self, id).await?)
    }

    async fn list_tasks(&self, milestone_id: &str) -> Result<Vec<Task>, StoreError> {
        Ok(Self::list_tasks(self, milestone_id).await?)
    }

    async fn insert_task(&self, new: &NewTask, now: DateTime<Utc>) -> Result<Task, StoreError> {
        Ok(Self::insert_task(self, new, now).await?)
    }

    async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        Ok(Self::save_task(self, task).await?)
    }

    async fn delete_task(&self, id: &str, now: DateTime<Utc>) -> Result<(), StoreError> {
        Ok(Self::delete_task(self, id, now).await?)
    }

    async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, StoreError> {
        Ok(Self::get_ticket(self, id).await?)
    }

    async fn list_tickets(&self, milestone_id: &str) -> Result<Vec<Ticket>, StoreError> {
        Ok(Self::list_tickets(self, milestone_id).await?)
    }

    async fn insert_ticket(
        &self,
        new: &NewTicket,
        now: DateTime<Utc>,
    ) -> Result<Ticket, StoreError> {
        Ok(Self::insert_ticket(self, new, now).await?)
    }

    async fn save_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        Ok(Self::save_ticket(self, ticket).await?)
    }

    async fn delete_ticket(&self, id: &str, now: DateTime<Utc>) -> Result<(), StoreError> {
        Ok(Self::delete_ticket(self, id, now).await?)
    }

    async fn list_admin_user_ids(&self) -> Result<Vec<String>, StoreError> {
        Ok(Self::list_admin_user_ids(self).await?)
    }

    async fn append_audit(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        Self::append_audit(self, entity_type, entity_id, action, detail.as_ref(), now).await?;
        Ok(())
    }
}

#[async_trait]
impl TemplateLookup for SqlStore {
    async fn milestone_estimated_days(
        &self,
        template_id: &str,
        milestone_name: &str,
    ) -> Result<Option<i64>, StoreError> {
        Ok(Self::milestone_estimated_days(self, template_id, milestone_name).await?)
    }

    async fn task_estimated_days(
        &self,
        template_id: &str,
        milestone_name: &str,
        task_title: &str,
    ) -> Result<Option<i64>, StoreError> {
        Ok(Self::task_estimated_days(self, template_id, milestone_name, task_title).await?)
    }
}

#[async_trait]
impl NotificationSink for SqlStore {
    async fn notify(
        &self,
        user_id: &str,
        kind: &str,
        message: &str,
        metadata: serde_json::Value,
    ) -> Result<(), StoreError> {
        self.create_notification(user_id, kind, message, Some(&metadata))
            .await?;
        Ok(())
    }
}
