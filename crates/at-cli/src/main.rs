use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use at_cli::commands::{employee, init, logs, punch, serve, status};
use at_cli::{Cli, Commands, Config, EmployeeAction};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(at_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = at_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();

    match cli.command {
        Some(Commands::Init { sample_users }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            init::run(&mut stdout, &db, &config.database_path, sample_users)?;
        }
        Some(Commands::Employee(action)) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            match action {
                EmployeeAction::Add {
                    name,
                    email,
                    password,
                    role,
                } => employee::add(&mut stdout, &db, &name, &email, password.as_deref(), role)?,
                EmployeeAction::List { json } => employee::list(&mut stdout, &db, json)?,
            }
        }
        Some(Commands::Punch { email, action }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            punch::run(&mut stdout, &db, &email, action, Utc::now())?;
        }
        Some(Commands::Status { email }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &db, &email)?;
        }
        Some(Commands::Logs {
            email,
            since,
            until,
            json,
        }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            logs::run(
                &mut stdout,
                &db,
                &email,
                since.as_deref(),
                until.as_deref(),
                json,
                Utc::now(),
            )?;
        }
        Some(Commands::Serve { host, port }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            drop(stdout);
            serve::run(config, db, host, port)?;
        }
        None => {
            use clap::CommandFactory;
            use std::io::Write;
            Cli::command().print_help()?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
