use clap::Subcommand;

/// Milestone commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MilestoneCommands {
    /// Add a milestone to a project.
    Create {
        #[arg(long)]
        project: String,
        #[arg(long)]
        name: String,
    },
    /// Recompute a milestone from its children, cascading to the project.
    Recompute { id: String },
}
