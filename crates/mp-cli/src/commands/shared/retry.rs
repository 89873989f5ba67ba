use std::future::Future;

use mp_status::StatusError;
use mp_status::retry::retry_on_conflict;

use crate::context::AppContext;

/// Run one engine operation, retrying the whole unit of work on write conflicts.
pub async fn retrying<T, F, Fut>(ctx: &AppContext, op: F) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StatusError>>,
{
    retry_on_conflict(&ctx.retry, op)
        .await
        .map_err(anyhow::Error::from)
}
