use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Project { action } => commands::project::handle(&action, ctx, flags).await,
        Commands::Milestone { action } => commands::milestone::handle(&action, ctx, flags).await,
        Commands::Task { action } => commands::task::handle(&action, ctx, flags).await,
        Commands::Ticket { action } => commands::ticket::handle(&action, ctx, flags).await,
        Commands::Template { action } => commands::template::handle(&action, ctx, flags).await,
        Commands::User { action } => commands::user::handle(&action, ctx, flags).await,
        Commands::Notifications(args) => commands::notifications::handle(&args, ctx, flags).await,
        Commands::RecomputeAll => commands::recompute_all::handle(ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
    }
}
