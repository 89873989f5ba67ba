use clap::Subcommand;

/// Task commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TaskCommands {
    /// Create a task under a milestone.
    Create {
        #[arg(long)]
        milestone: String,
        #[arg(long)]
        title: String,
        /// Initial status: Open (default), In Progress or Completed.
        #[arg(long)]
        status: Option<String>,
    },
    /// Set a task's status and propagate it.
    Status { id: String, status: String },
    /// Soft-delete a task.
    Delete { id: String },
}
