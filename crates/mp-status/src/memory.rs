//! In-memory implementation of every engine port.
//!
//! State lives behind `Arc<Mutex<_>>`; clones share it, so a test can keep a
//! handle while the engine owns another. `begin` snapshots the state and
//! `rollback` restores it. There is one snapshot slot, so units are gated:
//! a second `begin` waits until the open unit commits or rolls back. Ids are sequential (`tsk-00000001`), so ordering by
//! id is creation order.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use mp_core::entities::{
    AuditEntry, Milestone, Notification, Project, Task, Template, TemplateMilestone, TemplateTask,
    Ticket, User,
};
use mp_core::enums::{AuditAction, EntityType, ProjectStatus, UserRole, WorkStatus};
use mp_core::ids::{
    PREFIX_AUDIT, PREFIX_MILESTONE, PREFIX_NOTIFICATION, PREFIX_PROJECT, PREFIX_TASK,
    PREFIX_TEMPLATE, PREFIX_TEMPLATE_MILESTONE, PREFIX_TEMPLATE_TASK, PREFIX_TICKET, PREFIX_USER,
};

use crate::error::StoreError;
use crate::store::{
    DeliveryStore, NewMilestone, NewProject, NewTask, NewTicket, NotificationSink, TemplateLookup,
};
use crate::unit::UnitGate;

#[derive(Debug, Clone, Default)]
struct Tables {
    projects: BTreeMap<String, Project>,
    milestones: BTreeMap<String, Milestone>,
    tasks: BTreeMap<String, Task>,
    tickets: BTreeMap<String, Ticket>,
    templates: BTreeMap<String, Template>,
    template_milestones: BTreeMap<String, TemplateMilestone>,
    template_tasks: BTreeMap<String, TemplateTask>,
    users: BTreeMap<String, User>,
    notifications: Vec<Notification>,
    audit: Vec<AuditEntry>,
    writes: u64,
}

#[derive(Debug, Default)]
struct Inner {
    tables: Tables,
    snapshot: Option<Tables>,
    seq: u64,
    conflicting_begins: u32,
    failing_milestones: BTreeSet<String>,
}

impl Inner {
    fn next_id(&mut self, prefix: &str) -> String {
        self.seq += 1;
        format!("{prefix}-{:08x}", self.seq)
    }
}

/// Shared in-memory store for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
    unit: UnitGate,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Fixtures
    // ------------------------------------------------------------------

    pub async fn add_user(&self, name: &str, role: UserRole) -> User {
        let mut inner = self.inner.lock().await;
        let user = User {
            id: inner.next_id(PREFIX_USER),
            name: name.to_string(),
            email: None,
            role,
            deleted: false,
            created_at: Utc::now(),
        };
        inner.tables.users.insert(user.id.clone(), user.clone());
        user
    }

    pub async fn add_template(&self, name: &str) -> Template {
        let mut inner = self.inner.lock().await;
        let template = Template {
            id: inner.next_id(PREFIX_TEMPLATE),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        inner
            .tables
            .templates
            .insert(template.id.clone(), template.clone());
        template
    }

    pub async fn add_template_milestone(
        &self,
        template_id: &str,
        name: &str,
        estimated_days: i64,
    ) -> TemplateMilestone {
        let mut inner = self.inner.lock().await;
        let tm = TemplateMilestone {
            id: inner.next_id(PREFIX_TEMPLATE_MILESTONE),
            template_id: template_id.to_string(),
            name: name.to_string(),
            estimated_days,
        };
        inner
            .tables
            .template_milestones
            .insert(tm.id.clone(), tm.clone());
        tm
    }

    pub async fn add_template_task(
        &self,
        template_milestone_id: &str,
        title: &str,
        estimated_days: i64,
    ) -> TemplateTask {
        let mut inner = self.inner.lock().await;
        let tt = TemplateTask {
            id: inner.next_id(PREFIX_TEMPLATE_TASK),
            template_milestone_id: template_milestone_id.to_string(),
            title: title.to_string(),
            estimated_days,
        };
        inner.tables.template_tasks.insert(tt.id.clone(), tt.clone());
        tt
    }

    /// Overwrite a task's stored status without any propagation.
    pub async fn set_task_status_raw(&self, task_id: &str, status: &str) {
        let mut inner = self.inner.lock().await;
        if let Some(task) = inner.tables.tasks.get_mut(task_id) {
            task.status = status.to_string();
        }
    }

    /// Overwrite a milestone's stored status without any propagation.
    pub async fn set_milestone_status_raw(&self, milestone_id: &str, status: &str) {
        let mut inner = self.inner.lock().await;
        if let Some(milestone) = inner.tables.milestones.get_mut(milestone_id) {
            milestone.status = status.to_string();
        }
    }

    /// Overwrite a project's stored status without any propagation.
    pub async fn set_project_status_raw(&self, project_id: &str, status: ProjectStatus) {
        let mut inner = self.inner.lock().await;
        if let Some(project) = inner.tables.projects.get_mut(project_id) {
            project.status = status;
        }
    }

    // ------------------------------------------------------------------
    // Fault injection
    // ------------------------------------------------------------------

    /// The next `count` calls to `begin` fail with a conflict.
    pub async fn fail_next_begins(&self, count: u32) {
        self.inner.lock().await.conflicting_begins = count;
    }

    /// Every `save_milestone` for `milestone_id` fails with a backend error.
    pub async fn fail_milestone_saves(&self, milestone_id: &str) {
        self.inner
            .lock()
            .await
            .failing_milestones
            .insert(milestone_id.to_string());
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Number of committed-or-pending entity writes (inserts, saves, deletes).
    pub async fn writes(&self) -> u64 {
        self.inner.lock().await.tables.writes
    }

    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.inner.lock().await.tables.audit.clone()
    }

    pub async fn audit_for(&self, entity_id: &str) -> Vec<AuditEntry> {
        self.inner
            .lock()
            .await
            .tables
            .audit
            .iter()
            .filter(|entry| entry.entity_id == entity_id)
            .cloned()
            .collect()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.inner.lock().await.tables.notifications.clone()
    }

    /// Raw task row, including soft-deleted ones.
    pub async fn task_row(&self, task_id: &str) -> Option<Task> {
        self.inner.lock().await.tables.tasks.get(task_id).cloned()
    }
}

fn missing(entity: EntityType, id: &str) -> StoreError {
    StoreError::Backend(anyhow::anyhow!("{entity} {id} does not exist"))
}

fn matches_name(stored: &str, wanted: &str) -> bool {
    stored.trim().eq_ignore_ascii_case(wanted.trim())
}

#[async_trait]
impl DeliveryStore for InMemoryStore {
    async fn begin(&self) -> Result<(), StoreError> {
        self.unit.enter().await;
        let mut inner = self.inner.lock().await;
        if inner.conflicting_begins > 0 {
            inner.conflicting_begins -= 1;
            drop(inner);
            self.unit.leave().await;
            return Err(StoreError::Conflict("database is locked".into()));
        }
        inner.snapshot = Some(inner.tables.clone());
        Ok(())
    }

    async fn commit(&self) -> Result<(), StoreError> {
        self.inner.lock().await.snapshot = None;
        self.unit.leave().await;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.lock().await;
            if let Some(snapshot) = inner.snapshot.take() {
                inner.tables = snapshot;
            }
        }
        self.unit.leave().await;
        Ok(())
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.tables.projects.get(id).filter(|p| !p.deleted).cloned())
    }

    async fn list_project_ids(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .projects
            .values()
            .filter(|p| !p.deleted)
            .map(|p| p.id.clone())
            .collect())
    }

    async fn insert_project(
        &self,
        new: &NewProject,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError> {
        let mut inner = self.inner.lock().await;
        let project = Project {
            id: inner.next_id(PREFIX_PROJECT),
            name: new.name.clone(),
            status: ProjectStatus::Open,
            template_id: new.template_id.clone(),
            actual_start_date: None,
            actual_end_date: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        inner.tables.projects.insert(project.id.clone(), project.clone());
        inner.tables.writes += 1;
        Ok(project)
    }

    async fn save_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let stored = inner
            .tables
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| missing(EntityType::Project, &project.id))?;
        stored.status = project.status;
        stored.actual_start_date = project.actual_start_date;
        stored.actual_end_date = project.actual_end_date;
        stored.updated_at = project.updated_at;
        inner.tables.writes += 1;
        Ok(())
    }

    async fn get_milestone(&self, id: &str) -> Result<Option<Milestone>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .milestones
            .get(id)
            .filter(|m| !m.deleted)
            .cloned())
    }

    async fn list_milestones(&self, project_id: &str) -> Result<Vec<Milestone>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .milestones
            .values()
            .filter(|m| !m.deleted && m.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn insert_milestone(
        &self,
        new: &NewMilestone,
        now: DateTime<Utc>,
    ) -> Result<Milestone, StoreError> {
        let mut inner = self.inner.lock().await;
        let milestone = Milestone {
            id: inner.next_id(PREFIX_MILESTONE),
            project_id: new.project_id.clone(),
            name: new.name.clone(),
            status: WorkStatus::Open.as_str().to_string(),
            start_date: None,
            end_date: None,
            actual_date: None,
            estimated_date: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        inner
            .tables
            .milestones
            .insert(milestone.id.clone(), milestone.clone());
        inner.tables.writes += 1;
        Ok(milestone)
    }

    async fn save_milestone(&self, milestone: &Milestone) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.failing_milestones.contains(&milestone.id) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "injected failure saving milestone {}",
                milestone.id
            )));
        }
        let stored = inner
            .tables
            .milestones
            .get_mut(&milestone.id)
            .ok_or_else(|| missing(EntityType::Milestone, &milestone.id))?;
        stored.status.clone_from(&milestone.status);
        stored.start_date = milestone.start_date;
        stored.end_date = milestone.end_date;
        stored.actual_date = milestone.actual_date;
        stored.estimated_date = milestone.estimated_date;
        stored.updated_at = milestone.updated_at;
        inner.tables.writes += 1;
        Ok(())
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.tables.tasks.get(id).filter(|t| !t.deleted).cloned())
    }

    async fn list_tasks(&self, milestone_id: &str) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .tasks
            .values()
            .filter(|t| !t.deleted && t.milestone_id == milestone_id)
            .cloned()
            .collect())
    }

    async fn insert_task(&self, new: &NewTask, now: DateTime<Utc>) -> Result<Task, StoreError> {
        let mut inner = self.inner.lock().await;
        let task = Task {
            id: inner.next_id(PREFIX_TASK),
            milestone_id: new.milestone_id.clone(),
            title: new.title.clone(),
            status: new.status.as_str().to_string(),
            start_date: new.start_date,
            due_date: new.due_date,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        inner.tables.tasks.insert(task.id.clone(), task.clone());
        inner.tables.writes += 1;
        Ok(task)
    }

    async fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let stored = inner
            .tables
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| missing(EntityType::Task, &task.id))?;
        stored.status.clone_from(&task.status);
        stored.start_date = task.start_date;
        stored.due_date = task.due_date;
        stored.updated_at = task.updated_at;
        inner.tables.writes += 1;
        Ok(())
    }

    async fn delete_task(&self, id: &str, now: DateTime<Utc>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let stored = inner
            .tables
            .tasks
            .get_mut(id)
            .ok_or_else(|| missing(EntityType::Task, id))?;
        stored.deleted = true;
        stored.updated_at = now;
        inner.tables.writes += 1;
        Ok(())
    }

    async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.tables.tickets.get(id).filter(|t| !t.deleted).cloned())
    }

    async fn list_tickets(&self, milestone_id: &str) -> Result<Vec<Ticket>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .tickets
            .values()
            .filter(|t| !t.deleted && t.milestone_id == milestone_id)
            .cloned()
            .collect())
    }

    async fn insert_ticket(
        &self,
        new: &NewTicket,
        now: DateTime<Utc>,
    ) -> Result<Ticket, StoreError> {
        let mut inner = self.inner.lock().await;
        let ticket = Ticket {
            id: inner.next_id(PREFIX_TICKET),
            milestone_id: new.milestone_id.clone(),
            task_id: new.task_id.clone(),
            title: new.title.clone(),
            status: new.status.as_str().to_string(),
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        inner.tables.tickets.insert(ticket.id.clone(), ticket.clone());
        inner.tables.writes += 1;
        Ok(ticket)
    }

    async fn save_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let stored = inner
            .tables
            .tickets
            .get_mut(&ticket.id)
            .ok_or_else(|| missing(EntityType::Ticket, &ticket.id))?;
        stored.status.clone_from(&ticket.status);
        stored.updated_at = ticket.updated_at;
        inner.tables.writes += 1;
        Ok(())
    }

    async fn delete_ticket(&self, id: &str, now: DateTime<Utc>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let stored = inner
            .tables
            .tickets
            .get_mut(id)
            .ok_or_else(|| missing(EntityType::Ticket, id))?;
        stored.deleted = true;
        stored.updated_at = now;
        inner.tables.writes += 1;
        Ok(())
    }

    async fn list_admin_user_ids(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .users
            .values()
            .filter(|u| !u.deleted && u.role == UserRole::Admin)
            .map(|u| u.id.clone())
            .collect())
    }

    async fn append_audit(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let entry = AuditEntry {
            id: inner.next_id(PREFIX_AUDIT),
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail,
            created_at: now,
        };
        inner.tables.audit.push(entry);
        Ok(())
    }
}

#[async_trait]
impl TemplateLookup for InMemoryStore {
    async fn milestone_estimated_days(
        &self,
        template_id: &str,
        milestone_name: &str,
    ) -> Result<Option<i64>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .template_milestones
            .values()
            .find(|tm| tm.template_id == template_id && matches_name(&tm.name, milestone_name))
            .map(|tm| tm.estimated_days))
    }

    async fn task_estimated_days(
        &self,
        template_id: &str,
        milestone_name: &str,
        task_title: &str,
    ) -> Result<Option<i64>, StoreError> {
        let inner = self.inner.lock().await;
        let Some(tm) = inner
            .tables
            .template_milestones
            .values()
            .find(|tm| tm.template_id == template_id && matches_name(&tm.name, milestone_name))
        else {
            return Ok(None);
        };
        Ok(inner
            .tables
            .template_tasks
            .values()
            .find(|tt| tt.template_milestone_id == tm.id && matches_name(&tt.title, task_title))
            .map(|tt| tt.estimated_days))
    }
}

#[async_trait]
impl NotificationSink for InMemoryStore {
    async fn notify(
        &self,
        user_id: &str,
        kind: &str,
        message: &str,
        metadata: serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let notification = Notification {
            id: inner.next_id(PREFIX_NOTIFICATION),
            user_id: user_id.to_string(),
            kind: kind.to_string(),
            message: message.to_string(),
            metadata: Some(metadata),
            created_at: Utc::now(),
        };
        inner.tables.notifications.push(notification);
        Ok(())
    }
}
