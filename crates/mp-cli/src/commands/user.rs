use anyhow::Context;
use mp_core::enums::UserRole;
use mp_status::StatusError;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::UserCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mpost user`.
pub async fn handle(
    action: &UserCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        UserCommands::Create { name, email, admin } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(StatusError::Validation("user name must not be empty".into()).into());
            }
            let role = if *admin {
                UserRole::Admin
            } else {
                UserRole::Staff
            };
            let user = ctx
                .store
                .create_user(name, email.as_deref(), role)
                .await
                .context("failed to create user")?;
            output(&user, flags.format)
        }
    }
}
