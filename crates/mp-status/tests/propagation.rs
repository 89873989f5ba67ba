//! End-to-end propagation over the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use pretty_assertions::assert_eq;

use mp_core::enums::{AuditAction, EntityType, ProjectStatus, UserRole};
use mp_core::entities::Notification;
use mp_status::memory::InMemoryStore;
use mp_status::store::DeliveryStore;
use mp_status::{StatusEngine, StatusError};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 9, 30, 0).unwrap()
}

fn engine_over(store: &InMemoryStore) -> StatusEngine<InMemoryStore> {
    StatusEngine::new(store.clone())
        .with_notifier(Arc::new(store.clone()))
        .with_clock(fixed_now)
}

struct Tree {
    project_id: String,
    support_id: String,
}

async fn project_tree(engine: &StatusEngine<InMemoryStore>, template_id: Option<&str>) -> Tree {
    let project = engine.create_project("Acme rollout", template_id).await.unwrap();
    let support = engine
        .store()
        .list_milestones(&project.id)
        .await
        .unwrap()
        .into_iter()
        .find(|m| m.is_support())
        .unwrap();
    Tree {
        project_id: project.id,
        support_id: support.id,
    }
}

// ---------------------------------------------------------------------------
// Milestone roll-up
// ---------------------------------------------------------------------------

#[tokio::test]
async fn third_task_in_progress_moves_milestone_to_in_progress() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;
    let setup = engine.create_milestone(&tree.project_id, "Setup").await.unwrap();

    engine.create_task(&setup.id, "Provision", None).await.unwrap();
    engine.create_task(&setup.id, "Configure", None).await.unwrap();
    let milestone = store.get_milestone(&setup.id).await.unwrap().unwrap();
    assert_eq!(milestone.status, "Open");

    let third = engine.create_task(&setup.id, "Migrate", None).await.unwrap();
    let update = engine
        .update_task_status(&third.task.id, "In Progress")
        .await
        .unwrap();

    let milestone = update.milestone.expect("milestone changed");
    assert_eq!(milestone.status, "In Progress");
    assert_eq!(milestone.start_date, Some(fixed_now()));
    let project = update.project.expect("project changed");
    assert_eq!(project.status, ProjectStatus::InProgress);
    assert_eq!(project.actual_start_date, Some(fixed_now()));
}

#[tokio::test]
async fn completing_every_milestone_completes_project() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;
    let setup = engine.create_milestone(&tree.project_id, "Setup").await.unwrap();
    let qa = engine.create_milestone(&tree.project_id, "QA").await.unwrap();

    let qa_task = engine.create_task(&qa.id, "Regression", None).await.unwrap();
    engine
        .update_task_status(&qa_task.task.id, "Completed")
        .await
        .unwrap();

    let a = engine.create_task(&setup.id, "Provision", None).await.unwrap();
    let b = engine.create_task(&setup.id, "Configure", None).await.unwrap();
    engine.update_task_status(&a.task.id, "Completed").await.unwrap();
    let update = engine.update_task_status(&b.task.id, "Completed").await.unwrap();

    let milestone = update.milestone.expect("milestone changed");
    assert_eq!(milestone.status, "Completed");
    assert_eq!(milestone.actual_date, Some(fixed_now()));
    let project = update.project.expect("project changed");
    assert_eq!(project.status, ProjectStatus::Completed);
    assert_eq!(project.actual_end_date, Some(fixed_now()));
}

#[tokio::test]
async fn support_tickets_mixed_open_and_closed_is_in_progress() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;

    engine
        .create_ticket(&tree.support_id, None, "Login fails", None)
        .await
        .unwrap();
    let closed = engine
        .create_ticket(&tree.support_id, None, "Typo on invoice", None)
        .await
        .unwrap();
    let update = engine
        .update_ticket_status(&closed.ticket.id, "Closed")
        .await
        .unwrap();

    assert_eq!(update.milestone.expect("milestone changed").status, "In Progress");
    assert!(update.project.is_none());
    let project = store.get_project(&tree.project_id).await.unwrap().unwrap();
    assert_eq!(project.status, ProjectStatus::Open);
}

#[tokio::test]
async fn completed_support_milestone_does_not_affect_project() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;
    engine.create_milestone(&tree.project_id, "Design").await.unwrap();

    let ticket = engine
        .create_ticket(&tree.support_id, None, "Password reset", None)
        .await
        .unwrap();
    let update = engine
        .update_ticket_status(&ticket.ticket.id, "Completed")
        .await
        .unwrap();
    assert_eq!(update.milestone.expect("milestone changed").status, "Completed");

    let project = engine.update_project_status(&tree.project_id).await.unwrap();
    assert_eq!(project.status, ProjectStatus::Open);
}

#[tokio::test]
async fn template_estimates_drive_due_and_end_dates() {
    let store = InMemoryStore::new();
    let template = store.add_template("Standard delivery").await;
    let design = store.add_template_milestone(&template.id, "Design", 10).await;
    store.add_template_task(&design.id, "Wireframes", 5).await;

    let engine = engine_over(&store);
    let tree = project_tree(&engine, Some(&template.id)).await;
    let milestone = engine.create_milestone(&tree.project_id, "design").await.unwrap();
    let task = engine
        .create_task(&milestone.id, "Wireframes", None)
        .await
        .unwrap();

    let update = engine
        .update_task_status(&task.task.id, "In Progress")
        .await
        .unwrap();

    let start = update.task.start_date.expect("task start");
    assert_eq!(start, fixed_now());
    assert_eq!(update.task.due_date, Some(start + TimeDelta::days(5)));
    let milestone = update.milestone.expect("milestone changed");
    assert_eq!(milestone.status, "In Progress");
    assert_eq!(milestone.end_date, Some(fixed_now() + TimeDelta::days(10)));
}

#[tokio::test]
async fn missing_template_entries_leave_dates_unset() {
    let store = InMemoryStore::new();
    let template = store.add_template("Sparse").await;
    let engine = engine_over(&store);
    let tree = project_tree(&engine, Some(&template.id)).await;
    let milestone = engine.create_milestone(&tree.project_id, "Build").await.unwrap();
    let task = engine.create_task(&milestone.id, "Backend", None).await.unwrap();

    let update = engine
        .update_task_status(&task.task.id, "In Progress")
        .await
        .unwrap();

    assert_eq!(update.task.start_date, Some(fixed_now()));
    assert_eq!(update.task.due_date, None);
    assert_eq!(update.milestone.expect("milestone changed").end_date, None);
}

#[tokio::test]
async fn reopening_clears_milestone_completion_dates() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;
    let milestone = engine.create_milestone(&tree.project_id, "Launch").await.unwrap();
    let task = engine.create_task(&milestone.id, "Go live", None).await.unwrap();

    engine.update_task_status(&task.task.id, "Completed").await.unwrap();
    let update = engine.update_task_status(&task.task.id, "Open").await.unwrap();

    let milestone = update.milestone.expect("milestone changed");
    assert_eq!(milestone.status, "Open");
    assert_eq!(milestone.actual_date, None);
    let project = update.project.expect("project changed");
    assert_eq!(project.status, ProjectStatus::Open);
    assert_eq!(project.actual_start_date, None);
    assert_eq!(project.actual_end_date, None);
}

// ---------------------------------------------------------------------------
// No-op and errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn setting_same_status_writes_nothing() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;
    let milestone = engine.create_milestone(&tree.project_id, "Setup").await.unwrap();
    let task = engine.create_task(&milestone.id, "Provision", None).await.unwrap();
    engine
        .update_task_status(&task.task.id, "In Progress")
        .await
        .unwrap();

    let writes = store.writes().await;
    let audits = store.audit_entries().await.len();
    let update = engine
        .update_task_status(&task.task.id, "in_progress")
        .await
        .unwrap();

    assert!(update.milestone.is_none());
    assert!(update.project.is_none());
    assert_eq!(store.writes().await, writes);
    assert_eq!(store.audit_entries().await.len(), audits);
}

#[tokio::test]
async fn unknown_status_is_a_validation_error() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;
    let milestone = engine.create_milestone(&tree.project_id, "Setup").await.unwrap();
    let task = engine.create_task(&milestone.id, "Provision", None).await.unwrap();

    let err = engine
        .update_task_status(&task.task.id, "Done")
        .await
        .unwrap_err();
    assert!(matches!(err, StatusError::Validation(_)));

    let err = engine
        .update_task_status(&task.task.id, "Closed")
        .await
        .unwrap_err();
    assert!(matches!(err, StatusError::Validation(_)));
}

#[tokio::test]
async fn missing_entities_are_not_found() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);

    let err = engine
        .update_task_status("tsk-missing", "Open")
        .await
        .unwrap_err();
    assert_eq!(err.entity_id(), Some("tsk-missing"));
    assert_eq!(err.kind(), "not_found");

    let err = engine.update_milestone_status("mst-missing").await.unwrap_err();
    assert!(matches!(
        err,
        StatusError::NotFound {
            entity: EntityType::Milestone,
            ..
        }
    ));

    let err = engine
        .get_project_status_details("prj-missing")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StatusError::NotFound {
            entity: EntityType::Project,
            ..
        }
    ));
}

#[tokio::test]
async fn failed_propagation_rolls_back_task_write() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;
    let milestone = engine.create_milestone(&tree.project_id, "Setup").await.unwrap();
    let task = engine.create_task(&milestone.id, "Provision", None).await.unwrap();
    store.fail_milestone_saves(&milestone.id).await;

    let err = engine
        .update_task_status(&task.task.id, "In Progress")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "store");

    let task = store.get_task(&task.task.id).await.unwrap().unwrap();
    assert_eq!(task.status, "Open");
    assert_eq!(task.start_date, None);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn project_is_created_with_support_milestone() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;

    let milestones = store.list_milestones(&tree.project_id).await.unwrap();
    assert_eq!(milestones.len(), 1);
    assert_eq!(milestones[0].name, "Support");

    let err = engine
        .create_milestone(&tree.project_id, " support ")
        .await
        .unwrap_err();
    assert!(matches!(err, StatusError::Validation(_)));
}

#[tokio::test]
async fn deleting_last_active_task_reopens_milestone() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;
    let milestone = engine.create_milestone(&tree.project_id, "Setup").await.unwrap();
    engine.create_task(&milestone.id, "Provision", None).await.unwrap();
    let active = engine
        .create_task(&milestone.id, "Configure", Some("In Progress"))
        .await
        .unwrap();
    assert_eq!(
        active.milestone.expect("milestone changed").status,
        "In Progress"
    );

    let update = engine.delete_task(&active.task.id).await.unwrap();
    assert!(update.task.deleted);
    assert_eq!(update.milestone.expect("milestone changed").status, "Open");
    assert!(store.get_task(&active.task.id).await.unwrap().is_none());

    let actions: Vec<AuditAction> = store
        .audit_for(&active.task.id)
        .await
        .into_iter()
        .map(|entry| entry.action)
        .collect();
    assert_eq!(actions, vec![AuditAction::Created, AuditAction::Deleted]);
}

#[tokio::test]
async fn ticket_linked_to_missing_task_is_rejected() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;

    let err = engine
        .create_ticket(&tree.support_id, Some("tsk-gone"), "Broken link", None)
        .await
        .unwrap_err();
    assert_eq!(err.entity_id(), Some("tsk-gone"));
    assert!(store.list_tickets(&tree.support_id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completing_a_task_notifies_admins_once() {
    let store = InMemoryStore::new();
    let admin = store.add_user("Ada", UserRole::Admin).await;
    store.add_user("Sam", UserRole::Staff).await;
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;
    let milestone = engine.create_milestone(&tree.project_id, "Setup").await.unwrap();
    let task = engine.create_task(&milestone.id, "Provision", None).await.unwrap();

    engine.update_task_status(&task.task.id, "Completed").await.unwrap();
    engine.update_task_status(&task.task.id, "Completed").await.unwrap();

    let notifications = store.notifications().await;
    assert_eq!(notifications.len(), 1);
    let note = &notifications[0];
    assert_eq!(note.user_id, admin.id);
    assert_eq!(note.kind, Notification::KIND_TASK_COMPLETED);
    assert_eq!(
        note.metadata,
        Some(serde_json::json!({
            "task_id": task.task.id,
            "milestone_id": milestone.id,
            "project_id": tree.project_id,
        }))
    );
}

#[tokio::test]
async fn notifications_can_be_disabled() {
    let store = InMemoryStore::new();
    store.add_user("Ada", UserRole::Admin).await;
    let engine = engine_over(&store).notify_admins_on_completion(false);
    let tree = project_tree(&engine, None).await;
    let milestone = engine.create_milestone(&tree.project_id, "Setup").await.unwrap();
    let task = engine.create_task(&milestone.id, "Provision", None).await.unwrap();

    engine.update_task_status(&task.task.id, "Completed").await.unwrap();

    assert!(store.notifications().await.is_empty());
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_details_reflect_stored_tree() {
    let store = InMemoryStore::new();
    let engine = engine_over(&store);
    let tree = project_tree(&engine, None).await;
    let design = engine.create_milestone(&tree.project_id, "Design").await.unwrap();
    let task = engine.create_task(&design.id, "Mockups", None).await.unwrap();
    engine
        .update_task_status(&task.task.id, "In Progress")
        .await
        .unwrap();
    let writes = store.writes().await;

    let details = engine
        .get_project_status_details(&tree.project_id)
        .await
        .unwrap();

    assert_eq!(store.writes().await, writes);
    assert_eq!(details.project.status, ProjectStatus::InProgress);
    assert_eq!(details.milestones.len(), 2);
    assert_eq!(details.milestones[0].name, "Support");
    assert!(details.milestones[0].tasks.is_empty());
    let design = &details.milestones[1];
    assert_eq!(design.status, "In Progress");
    assert_eq!(design.start_date, Some(fixed_now()));
    assert_eq!(design.tasks.len(), 1);
    assert_eq!(design.tasks[0].title, "Mockups");
    assert_eq!(design.tasks[0].status, "In Progress");
}
