use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use mp_config::MpConfig;
use mp_db::SqlStore;
use mp_status::StatusEngine;
use mp_status::retry::RetryPolicy;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: MpConfig,
    pub store: SqlStore,
    pub engine: StatusEngine<SqlStore>,
    pub retry: RetryPolicy,
}

impl AppContext {
    /// Open the database at `db_override` or `database.path` and wire the engine.
    pub async fn init(config: MpConfig, db_override: Option<&str>) -> anyhow::Result<Self> {
        let path = db_override.map_or_else(|| config.database.path.clone(), String::from);
        if path != ":memory:" {
            ensure_parent_dir(Path::new(&path))?;
        }

        let busy_timeout = std::time::Duration::from_millis(config.database.busy_timeout_ms);
        let store = SqlStore::open_local(&path, busy_timeout)
            .await
            .with_context(|| format!("failed to open milepost database at {path}"))?;
        tracing::debug!(%path, "database opened");

        let engine = StatusEngine::new(store.clone())
            .with_notifier(Arc::new(store.clone()))
            .notify_admins_on_completion(config.propagation.notify_admins_on_completion);

        let retry = RetryPolicy {
            max_attempts: config.propagation.retry_attempts,
            base_delay: config.propagation.retry_base_delay(),
            max_delay: config.propagation.retry_max_delay(),
        };

        Ok(Self {
            config,
            store,
            engine,
            retry,
        })
    }
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use mp_config::MpConfig;

    use super::AppContext;

    #[tokio::test]
    async fn init_creates_database_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("milepost.db");
        let path = path.to_string_lossy().to_string();

        let ctx = AppContext::init(MpConfig::default(), Some(&path))
            .await
            .expect("context should open");

        assert!(dir.path().join("nested").is_dir());
        assert_eq!(ctx.retry.max_attempts, 4);
    }

    #[tokio::test]
    async fn in_memory_database_needs_no_directory() {
        let ctx = AppContext::init(MpConfig::default(), Some(":memory:"))
            .await
            .expect("context should open");
        assert!(ctx.store.list_project_ids().await.expect("query").is_empty());
    }
}
