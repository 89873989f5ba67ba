use clap::Subcommand;

/// Project commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProjectCommands {
    /// Create a project (a Support milestone is added automatically).
    Create {
        #[arg(long)]
        name: String,
        /// Template supplying estimated durations.
        #[arg(long)]
        template: Option<String>,
    },
    /// List projects.
    List,
    /// Show project and milestone statuses with their tasks.
    Status { id: String },
    /// Recompute the project status from its milestones.
    Recompute { id: String },
}
