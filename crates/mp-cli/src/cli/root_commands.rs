use clap::Args;
use clap::Subcommand;

use crate::cli::subcommands::{
    MilestoneCommands, ProjectCommands, TaskCommands, TemplateCommands, TicketCommands,
    UserCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Projects and their derived status.
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Milestones.
    Milestone {
        #[command(subcommand)]
        action: MilestoneCommands,
    },
    /// Tasks.
    Task {
        #[command(subcommand)]
        action: TaskCommands,
    },
    /// Tickets.
    Ticket {
        #[command(subcommand)]
        action: TicketCommands,
    },
    /// Delivery templates with estimated durations.
    Template {
        #[command(subcommand)]
        action: TemplateCommands,
    },
    /// Users (admins receive completion notifications).
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// List a user's notifications, newest first.
    Notifications(NotificationsArgs),
    /// Recompute every project's milestones and status.
    RecomputeAll,
    /// Show the audit trail of one entity.
    Audit(AuditArgs),
}

#[derive(Clone, Debug, Args)]
pub struct NotificationsArgs {
    pub user_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    pub entity_id: String,
}
