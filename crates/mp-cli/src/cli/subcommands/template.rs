use clap::Subcommand;

/// Template commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TemplateCommands {
    /// Create an empty template.
    Create {
        #[arg(long)]
        name: String,
    },
    /// Add a milestone estimate to a template.
    AddMilestone {
        template_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        days: i64,
    },
    /// Add a task estimate to a template milestone.
    AddTask {
        template_milestone_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        days: i64,
    },
}
