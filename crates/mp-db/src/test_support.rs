//! Shared test utilities for mp-db unit tests.

pub(crate) mod helpers {
    use chrono::Utc;

    use mp_core::entities::{Milestone, Project};
    use mp_status::store::{NewMilestone, NewProject};

    use crate::{DEFAULT_BUSY_TIMEOUT, SqlStore};

    /// In-memory store with the schema applied.
    pub async fn test_store() -> SqlStore {
        SqlStore::open_local(":memory:", DEFAULT_BUSY_TIMEOUT)
            .await
            .unwrap()
    }

    /// Insert a bare project row (no Support milestone).
    pub async fn seed_project(store: &SqlStore, name: &str) -> Project {
        store
            .insert_project(
                &NewProject {
                    name: name.to_string(),
                    template_id: None,
                },
                Utc::now(),
            )
            .await
            .unwrap()
    }

    pub async fn seed_milestone(store: &SqlStore, project_id: &str, name: &str) -> Milestone {
        store
            .insert_milestone(
                &NewMilestone {
                    project_id: project_id.to_string(),
                    name: name.to_string(),
                },
                Utc::now(),
            )
            .await
            .unwrap()
    }
}
