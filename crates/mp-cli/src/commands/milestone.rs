use crate::cli::GlobalFlags;
use crate::cli::subcommands::MilestoneCommands;
use crate::commands::shared::retry::retrying;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mpost milestone`.
pub async fn handle(
    action: &MilestoneCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let engine = &ctx.engine;
    match action {
        MilestoneCommands::Create { project, name } => {
            let (project, name) = (project.as_str(), name.as_str());
            let milestone = retrying(ctx, move || engine.create_milestone(project, name)).await?;
            output(&milestone, flags.format)
        }
        MilestoneCommands::Recompute { id } => {
            let id = id.as_str();
            let milestone = retrying(ctx, move || engine.update_milestone_status(id)).await?;
            output(&milestone, flags.format)
        }
    }
}
