use clap::Subcommand;

/// Ticket commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TicketCommands {
    /// File a ticket under a milestone.
    Create {
        #[arg(long)]
        milestone: String,
        /// Task the ticket relates to.
        #[arg(long)]
        task: Option<String>,
        #[arg(long)]
        title: String,
        #[arg(long)]
        status: Option<String>,
    },
    /// Set a ticket's status and propagate it.
    Status { id: String, status: String },
    /// Soft-delete a ticket.
    Delete { id: String },
}
