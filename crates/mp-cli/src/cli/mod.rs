use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `mpost` binary.
#[derive(Debug, Parser)]
#[command(
    name = "mpost",
    version,
    about = "Milepost - delivery status propagation for projects, milestones, tasks and tickets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database file (overrides `database.path`)
    #[arg(long, global = true)]
    pub db: Option<String>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::subcommands::{ProjectCommands, TaskCommands, TicketCommands, UserCommands};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "mpost",
            "--format",
            "table",
            "--limit",
            "10",
            "--verbose",
            "recompute-all",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::RecomputeAll));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["mpost", "recompute-all", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["mpost", "--format", "xml", "recompute-all"]).is_err());
    }

    #[test]
    fn db_flag_is_copied_into_global_flags() {
        let cli = Cli::try_parse_from(["mpost", "--db", "/tmp/mp.db", "project", "list"])
            .expect("cli should parse");
        assert_eq!(cli.global_flags().db.as_deref(), Some("/tmp/mp.db"));
        assert!(matches!(
            cli.command,
            Commands::Project {
                action: ProjectCommands::List
            }
        ));
    }

    #[test]
    fn task_status_takes_status_with_spaces() {
        let cli = Cli::try_parse_from(["mpost", "task", "status", "tsk-1", "In Progress"])
            .expect("cli should parse");
        match cli.command {
            Commands::Task {
                action: TaskCommands::Status { id, status },
            } => {
                assert_eq!(id, "tsk-1");
                assert_eq!(status, "In Progress");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn ticket_create_accepts_optional_task_link() {
        let cli = Cli::try_parse_from([
            "mpost",
            "ticket",
            "create",
            "--milestone",
            "mst-1",
            "--task",
            "tsk-1",
            "--title",
            "Login fails",
        ])
        .expect("cli should parse");
        match cli.command {
            Commands::Ticket {
                action:
                    TicketCommands::Create {
                        milestone,
                        task,
                        title,
                        status,
                    },
            } => {
                assert_eq!(milestone, "mst-1");
                assert_eq!(task.as_deref(), Some("tsk-1"));
                assert_eq!(title, "Login fails");
                assert!(status.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn user_create_admin_flag() {
        let cli = Cli::try_parse_from(["mpost", "user", "create", "--name", "Ada", "--admin"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::User {
                action: UserCommands::Create { admin: true, .. }
            }
        ));
    }
}
