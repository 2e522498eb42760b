//! Command-line argument definitions.

use std::path::PathBuf;

use at_core::{ActionType, Role};
use clap::{Parser, Subcommand};

/// Employee attendance tracker.
///
/// Records punches (login, logout, break start, break end) and reports
/// worked, break and net time per employee.
#[derive(Debug, Parser)]
#[command(name = "at", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database, optionally with sample accounts.
    Init {
        /// Add the Jane Doe (employee) and Admin User (admin) sample accounts.
        #[arg(long)]
        sample_users: bool,
    },

    /// Manage employees.
    #[command(subcommand)]
    Employee(EmployeeAction),

    /// Record a punch for an employee, timestamped now.
    Punch {
        /// The employee's email.
        #[arg(long)]
        email: String,

        /// One of: login, logout, break_start, break_end.
        action: ActionType,
    },

    /// Show an employee's current status.
    Status {
        /// The employee's email.
        #[arg(long)]
        email: String,
    },

    /// Show an employee's punches with work/break/net totals.
    Logs {
        /// The employee's email.
        #[arg(long)]
        email: String,

        /// Only punches at or after this time (ISO 8601 or e.g. "2 days ago").
        #[arg(long)]
        since: Option<String>,

        /// Only punches before this time (ISO 8601 or e.g. "1 hour ago").
        #[arg(long)]
        until: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP server.
    Serve {
        /// Host to bind, overriding the config file.
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overriding the config file.
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Employee management actions.
#[derive(Debug, Subcommand)]
pub enum EmployeeAction {
    /// Add an employee.
    Add {
        /// Display name.
        #[arg(long)]
        name: String,

        /// Email address (unique).
        #[arg(long)]
        email: String,

        /// Local password. Omit for SSO-only accounts.
        #[arg(long)]
        password: Option<String>,

        /// employee or admin.
        #[arg(long, default_value = "employee")]
        role: Role,
    },

    /// List employees.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_punch_action() {
        let cli = Cli::try_parse_from(["at", "punch", "--email", "jane@example.com", "break_start"])
            .unwrap();
        match cli.command {
            Some(Commands::Punch { email, action }) => {
                assert_eq!(email, "jane@example.com");
                assert_eq!(action, ActionType::BreakStart);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_punch_action() {
        let result = Cli::try_parse_from(["at", "punch", "--email", "jane@example.com", "nap"]);
        assert!(result.is_err());
    }

    #[test]
    fn employee_add_defaults_to_employee_role() {
        let cli = Cli::try_parse_from([
            "at", "employee", "add", "--name", "Bob", "--email", "bob@example.com",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Employee(EmployeeAction::Add { role, password, .. })) => {
                assert_eq!(role, Role::Employee);
                assert!(password.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
