use anyhow::Context;
use mp_core::enums::EntityType;
use mp_status::StatusError;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TemplateCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mpost template`.
pub async fn handle(
    action: &TemplateCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        TemplateCommands::Create { name } => {
            let name = require_text(name, "template name")?;
            let template = ctx
                .store
                .create_template(name)
                .await
                .context("failed to create template")?;
            output(&template, flags.format)
        }
        TemplateCommands::AddMilestone {
            template_id,
            name,
            days,
        } => {
            let name = require_text(name, "milestone name")?;
            require_days(*days)?;
            if ctx
                .store
                .get_template(template_id)
                .await
                .context("failed to look up template")?
                .is_none()
            {
                return Err(StatusError::not_found(EntityType::Template, template_id).into());
            }
            let milestone = ctx
                .store
                .add_template_milestone(template_id, name, *days)
                .await
                .context("failed to add template milestone")?;
            output(&milestone, flags.format)
        }
        TemplateCommands::AddTask {
            template_milestone_id,
            title,
            days,
        } => {
            let title = require_text(title, "task title")?;
            require_days(*days)?;
            let task = ctx
                .store
                .add_template_task(template_milestone_id, title, *days)
                .await
                .with_context(|| {
                    format!("failed to add task to template milestone {template_milestone_id}")
                })?;
            output(&task, flags.format)
        }
    }
}

fn require_text<'a>(value: &'a str, field: &str) -> anyhow::Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StatusError::Validation(format!("{field} must not be empty")).into());
    }
    Ok(trimmed)
}

fn require_days(days: i64) -> anyhow::Result<()> {
    if days < 0 {
        return Err(
            StatusError::Validation(format!("estimated days must not be negative, got {days}"))
                .into(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_days, require_text};

    #[test]
    fn blank_names_are_rejected() {
        assert!(require_text("   ", "template name").is_err());
        assert_eq!(require_text(" Standard ", "template name").unwrap(), "Standard");
    }

    #[test]
    fn negative_days_are_rejected() {
        assert!(require_days(-1).is_err());
        assert!(require_days(0).is_ok());
    }
}
