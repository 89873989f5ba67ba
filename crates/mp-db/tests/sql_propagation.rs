//! Engine propagation over the libSQL store.
//!
//! - Full task → milestone → project cascade with audit rows
//! - Rollback of a failed unit of work
//! - Write-lock contention surfacing as a retryable conflict, at begin or commit
//! - Concurrent units of work over one shared store
//! - Bulk recompute idempotence on disk

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use mp_core::enums::{AuditAction, EntityType, ProjectStatus, UserRole};
use mp_core::entities::Notification;
use mp_db::{DEFAULT_BUSY_TIMEOUT, DeliveryDb, SqlStore};
use mp_status::retry::{RetryPolicy, retry_on_conflict};
use mp_status::store::DeliveryStore;
use mp_status::{StatusEngine, StatusError};

async fn memory_engine() -> StatusEngine<SqlStore> {
    let store = SqlStore::open_local(":memory:", DEFAULT_BUSY_TIMEOUT)
        .await
        .unwrap();
    StatusEngine::new(store.clone()).with_notifier(Arc::new(store))
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

#[tokio::test]
async fn task_completion_cascades_and_audits() {
    let engine = memory_engine().await;
    let store = engine.store().clone();
    let admin = store.create_user("Ada", None, UserRole::Admin).await.unwrap();

    let project = engine.create_project("Intranet", None).await.unwrap();
    let build = engine.create_milestone(&project.id, "Build").await.unwrap();
    let task = engine.create_task(&build.id, "Deploy", None).await.unwrap();

    let started = engine
        .update_task_status(&task.task.id, "In Progress")
        .await
        .unwrap();
    assert_eq!(started.milestone.unwrap().status, "In Progress");
    assert_eq!(started.project.unwrap().status, ProjectStatus::InProgress);

    let done = engine
        .update_task_status(&task.task.id, "Completed")
        .await
        .unwrap();
    let milestone = done.milestone.unwrap();
    assert_eq!(milestone.status, "Completed");
    assert!(milestone.actual_date.is_some());
    let project = done.project.unwrap();
    assert_eq!(project.status, ProjectStatus::Completed);
    assert!(project.actual_start_date.is_some());
    assert!(project.actual_end_date.is_some());

    let milestone_audit = store.list_audit(&build.id, 50).await.unwrap();
    let actions: Vec<AuditAction> = milestone_audit.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::Created,
            AuditAction::StatusChanged,
            AuditAction::StatusChanged
        ]
    );
    assert_eq!(milestone_audit[2].entity_type, EntityType::Milestone);
    assert_eq!(
        milestone_audit[2].detail,
        Some(serde_json::json!({"from": "In Progress", "to": "Completed", "reason": "rollup"}))
    );

    let notes = store.list_notifications(&admin.id, 10).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, Notification::KIND_TASK_COMPLETED);
}

#[tokio::test]
async fn template_dates_come_from_sql_lookup() {
    let engine = memory_engine().await;
    let store = engine.store().clone();
    let template = store.create_template("Standard").await.unwrap();
    let design = store
        .add_template_milestone(&template.id, "Design", 10)
        .await
        .unwrap();
    store
        .add_template_task(&design.id, "Mockups", 5)
        .await
        .unwrap();

    let project = engine
        .create_project("Portal", Some(&template.id))
        .await
        .unwrap();
    let milestone = engine.create_milestone(&project.id, "Design").await.unwrap();
    let created = engine
        .create_task(&milestone.id, "Mockups", Some("In Progress"))
        .await
        .unwrap();

    let start = created.task.start_date.unwrap();
    assert_eq!(created.task.due_date, Some(start + chrono::TimeDelta::days(5)));
    let milestone = created.milestone.unwrap();
    let m_start = milestone.start_date.unwrap();
    assert_eq!(milestone.end_date, Some(m_start + chrono::TimeDelta::days(10)));
}

#[tokio::test]
async fn validation_failure_leaves_no_trace() {
    let engine = memory_engine().await;
    let project = engine.create_project("Intranet", None).await.unwrap();
    let build = engine.create_milestone(&project.id, "Build").await.unwrap();

    let err = engine
        .create_task(&build.id, "Deploy", Some("Approval"))
        .await
        .unwrap_err();
    assert!(matches!(err, StatusError::Validation(_)));

    let err = engine
        .create_task("mst-00000000", "Orphan", None)
        .await
        .unwrap_err();
    assert_eq!(err.entity_id(), Some("mst-00000000"));
    assert!(engine.store().list_tasks(&build.id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rollback_discards_partial_writes() {
    let engine = memory_engine().await;
    let store = engine.store().clone();
    let project = engine.create_project("Intranet", None).await.unwrap();

    store.begin().await.unwrap();
    let orphan = engine_free_milestone(&store, &project.id).await;
    store.rollback().await.unwrap();

    assert!(store.get_milestone(&orphan).await.unwrap().is_none());
    assert_eq!(store.list_milestones(&project.id).await.unwrap().len(), 1);
}

async fn engine_free_milestone(store: &SqlStore, project_id: &str) -> String {
    store
        .insert_milestone(
            &mp_status::store::NewMilestone {
                project_id: project_id.to_string(),
                name: "Scratch".into(),
            },
            chrono::Utc::now(),
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn competing_writer_gets_conflict() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("milepost.db");
    let path = path.to_str().unwrap();

    let holder = SqlStore::open_local(path, DEFAULT_BUSY_TIMEOUT).await.unwrap();
    let contender = SqlStore::open_local(path, Duration::from_millis(50))
        .await
        .unwrap();
    let engine = StatusEngine::new(contender);

    DeliveryStore::begin(&holder).await.unwrap();
    let err = engine.create_project("Blocked", None).await.unwrap_err();
    assert!(err.is_conflict(), "expected conflict, got {err}");
    DeliveryStore::rollback(&holder).await.unwrap();

    let project = engine.create_project("Unblocked", None).await.unwrap();
    assert_eq!(project.status, ProjectStatus::Open);
}

#[tokio::test]
async fn commit_conflict_rolls_back_and_retry_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("milepost.db");
    let path = path.to_str().unwrap();

    let store = SqlStore::open_local(path, Duration::from_millis(50))
        .await
        .unwrap();
    let engine = StatusEngine::new(store.clone());

    // An open read transaction blocks the writer's commit but not its begin
    let reader = DeliveryDb::open_local(path, DEFAULT_BUSY_TIMEOUT).await.unwrap();
    reader.conn().execute("BEGIN", ()).await.unwrap();
    let mut rows = reader
        .conn()
        .query("SELECT count(*) FROM projects", ())
        .await
        .unwrap();
    assert!(rows.next().await.unwrap().is_some());
    drop(rows);

    let err = engine.create_project("First", None).await.unwrap_err();
    assert!(err.is_conflict(), "expected conflict, got {err}");

    reader.conn().execute("COMMIT", ()).await.unwrap();

    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
    };
    let project = retry_on_conflict(&policy, || engine.create_project("Second", None))
        .await
        .unwrap();
    assert_eq!(project.name, "Second");

    let ids = store.list_project_ids().await.unwrap();
    assert_eq!(ids, vec![project.id]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_units_on_one_store_serialize() {
    let engine = Arc::new(memory_engine().await);
    let project = engine.create_project("Intranet", None).await.unwrap();
    let build = engine.create_milestone(&project.id, "Build").await.unwrap();

    let mut task_ids = Vec::new();
    for n in 0..8 {
        let task = engine
            .create_task(&build.id, &format!("Step {n}"), None)
            .await
            .unwrap();
        task_ids.push(task.task.id);
    }

    let handles: Vec<_> = task_ids
        .into_iter()
        .map(|task_id| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.update_task_status(&task_id, "Completed").await })
        })
        .collect();
    for handle in handles {
        let update = handle.await.unwrap();
        assert!(update.is_ok(), "unit failed: {:?}", update.err());
    }

    // The last committed unit saw every sibling completed
    let milestone = engine.store().get_milestone(&build.id).await.unwrap().unwrap();
    assert_eq!(milestone.status, "Completed");
    assert!(milestone.actual_date.is_some());

    let details = engine.get_project_status_details(&project.id).await.unwrap();
    assert_eq!(details.project.status, ProjectStatus::Completed);
    let build_tasks = &details.milestones[1].tasks;
    assert_eq!(build_tasks.len(), 8);
    assert!(build_tasks.iter().all(|t| t.status == "Completed"));
}

// ---------------------------------------------------------------------------
// Bulk
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bulk_recompute_twice_writes_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("milepost.db");
    let store = SqlStore::open_local(path.to_str().unwrap(), DEFAULT_BUSY_TIMEOUT)
        .await
        .unwrap();
    let engine = StatusEngine::new(store.clone());

    let project = engine.create_project("Legacy import", None).await.unwrap();
    let build = engine.create_milestone(&project.id, "Build").await.unwrap();
    let task = engine.create_task(&build.id, "Port data", None).await.unwrap();
    store
        .db()
        .conn()
        .execute(
            "UPDATE tasks SET status = 'Completed' WHERE id = ?1",
            [task.task.id.as_str()],
        )
        .await
        .unwrap();

    let first = engine.recompute_all_projects().await.unwrap();
    assert_eq!(first.succeeded, 1);
    assert_eq!(first.writes, 2);
    assert_eq!(first.results[0].status, Some(ProjectStatus::Completed));

    let second = engine.recompute_all_projects().await.unwrap();
    assert_eq!(second.writes, 0);
    assert!(second.results.iter().all(|r| !r.project_changed));

    let details = engine.get_project_status_details(&project.id).await.unwrap();
    assert_eq!(details.project.status, ProjectStatus::Completed);
    assert_eq!(details.milestones[1].tasks[0].status, "Completed");
}
