use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mpost recompute-all`.
///
/// Per-project failures are part of the report; only a failure to list
/// projects aborts the command.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = ctx.engine.recompute_all_projects().await?;
    if report.failed > 0 {
        tracing::warn!(
            failed = report.failed,
            succeeded = report.succeeded,
            "some projects could not be recomputed"
        );
    }
    output(&report, flags.format)
}
