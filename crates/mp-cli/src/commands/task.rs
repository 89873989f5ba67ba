use crate::cli::GlobalFlags;
use crate::cli::subcommands::TaskCommands;
use crate::commands::shared::retry::retrying;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mpost task`.
pub async fn handle(
    action: &TaskCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let engine = &ctx.engine;
    let update = match action {
        TaskCommands::Create {
            milestone,
            title,
            status,
        } => {
            let (milestone, title, status) = (milestone.as_str(), title.as_str(), status.as_deref());
            retrying(ctx, move || engine.create_task(milestone, title, status)).await?
        }
        TaskCommands::Status { id, status } => {
            let (id, status) = (id.as_str(), status.as_str());
            retrying(ctx, move || engine.update_task_status(id, status)).await?
        }
        TaskCommands::Delete { id } => {
            let id = id.as_str();
            retrying(ctx, move || engine.delete_task(id)).await?
        }
    };
    output(&update, flags.format)
}
