//! The status engine: aggregators, coordinator, bulk recompute, and snapshot.
//!
//! Public operations each run as one unit of work on the injected store.
//! Internal `recompute_*` methods assume a unit is already open so they can be
//! composed (coordinator → milestone → project, or bulk → milestones → project).

mod bulk;
mod coordinator;
mod details;
mod lifecycle;
mod milestone;
mod project;

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::StatusError;
use crate::store::{DeliveryStore, LogNotifier, NotificationSink, TemplateLookup};

/// Source of "now" for date side effects.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Whether a milestone recompute may ascend to the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cascade {
    Project,
    None,
}

/// Derives milestone and project status from their children and persists
/// the result when it changes.
pub struct StatusEngine<S> {
    store: S,
    notifier: Arc<dyn NotificationSink>,
    clock: Clock,
    notify_admins_on_completion: bool,
}

impl<S> StatusEngine<S>
where
    S: DeliveryStore + TemplateLookup,
{
    /// Engine over `store`, logging notifications and using the system clock.
    pub fn new(store: S) -> Self {
        Self {
            store,
            notifier: Arc::new(LogNotifier),
            clock: Arc::new(Utc::now),
            notify_admins_on_completion: true,
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Toggle admin notifications on task completion.
    #[must_use]
    pub fn notify_admins_on_completion(mut self, enabled: bool) -> Self {
        self.notify_admins_on_completion = enabled;
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Run `work` between `begin` and `commit`, rolling back when either
    /// the work or the commit fails.
    async fn in_unit<T, F>(&self, work: F) -> Result<T, StatusError>
    where
        F: Future<Output = Result<T, StatusError>>,
    {
        self.store.begin().await?;
        let error = match work.await {
            Ok(value) => match self.store.commit().await {
                Ok(()) => return Ok(value),
                Err(commit_error) => StatusError::from(commit_error),
            },
            Err(error) => error,
        };
        if let Err(rollback_error) = self.store.rollback().await {
            tracing::warn!(%rollback_error, "rollback failed after: {error}");
        }
        Err(error)
    }
}

/// `start + days`, or `None` for negative or out-of-range durations.
pub(crate) fn add_days(start: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    if days < 0 {
        return None;
    }
    TimeDelta::try_days(days).and_then(|delta| start.checked_add_signed(delta))
}
