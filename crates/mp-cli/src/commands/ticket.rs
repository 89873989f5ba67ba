use crate::cli::GlobalFlags;
use crate::cli::subcommands::TicketCommands;
use crate::commands::shared::retry::retrying;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mpost ticket`.
pub async fn handle(
    action: &TicketCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let engine = &ctx.engine;
    let update = match action {
        TicketCommands::Create {
            milestone,
            task,
            title,
            status,
        } => {
            let milestone = milestone.as_str();
            let task = task.as_deref();
            let title = title.as_str();
            let status = status.as_deref();
            retrying(ctx, move || engine.create_ticket(milestone, task, title, status)).await?
        }
        TicketCommands::Status { id, status } => {
            let (id, status) = (id.as_str(), status.as_str());
            retrying(ctx, move || engine.update_ticket_status(id, status)).await?
        }
        TicketCommands::Delete { id } => {
            let id = id.as_str();
            retrying(ctx, move || engine.delete_ticket(id)).await?
        }
    };
    output(&update, flags.format)
}
