use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

/// Audit trails grow with every status change, so the default page is larger.
const DEFAULT_AUDIT_LIMIT: u32 = 200;

/// Handle `mpost audit`.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let limit = effective_limit(None, flags.limit, DEFAULT_AUDIT_LIMIT);
    let entries = ctx
        .store
        .list_audit(&args.entity_id, limit)
        .await
        .context("failed to read audit trail")?;
    output(&entries, flags.format)
}
