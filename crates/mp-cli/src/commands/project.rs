use anyhow::Context;
use mp_core::enums::EntityType;
use mp_status::StatusError;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProjectCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::retry::retrying;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mpost project`.
pub async fn handle(
    action: &ProjectCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let engine = &ctx.engine;
    match action {
        ProjectCommands::Create { name, template } => {
            if let Some(template_id) = template.as_deref() {
                ensure_template(ctx, template_id).await?;
            }
            let (name, template) = (name.as_str(), template.as_deref());
            let project = retrying(ctx, move || engine.create_project(name, template)).await?;
            output(&project, flags.format)
        }
        ProjectCommands::List => {
            let limit = effective_limit(None, flags.limit, ctx.config.general.default_limit);
            let projects = ctx
                .store
                .list_projects(limit)
                .await
                .context("failed to list projects")?;
            output(&projects, flags.format)
        }
        ProjectCommands::Status { id } => {
            let details = engine.get_project_status_details(id).await?;
            output(&details, flags.format)
        }
        ProjectCommands::Recompute { id } => {
            let id = id.as_str();
            let project = retrying(ctx, move || engine.update_project_status(id)).await?;
            output(&project, flags.format)
        }
    }
}

async fn ensure_template(ctx: &AppContext, template_id: &str) -> anyhow::Result<()> {
    let found = ctx
        .store
        .get_template(template_id)
        .await
        .context("failed to look up template")?;
    if found.is_none() {
        return Err(StatusError::not_found(EntityType::Template, template_id).into());
    }
    Ok(())
}
