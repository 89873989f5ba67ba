use anyhow::Context;
use mp_core::enums::EntityType;
use mp_status::StatusError;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::NotificationsArgs;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mpost notifications`.
pub async fn handle(
    args: &NotificationsArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let user = ctx
        .store
        .get_user(&args.user_id)
        .await
        .context("failed to look up user")?;
    if user.is_none() {
        return Err(StatusError::not_found(EntityType::User, &args.user_id).into());
    }

    let limit = effective_limit(None, flags.limit, ctx.config.general.default_limit);
    let notifications = ctx
        .store
        .list_notifications(&args.user_id, limit)
        .await
        .context("failed to list notifications")?;
    output(&notifications, flags.format)
}
