//! gitri CLI
//!
//! Keeps a tree of independent git repositories in sync with a shared manifest.
//!
//! Exit codes: `0` success, `1` command failure, `2` usage error.

mod cli;
mod commands;
mod error;

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    // clap exits with status 2 on usage errors and a missing command
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("{}: tracing subscriber already installed", "warning".yellow());
    }
}

fn run(command: Commands) -> Result<()> {
    let cwd = std::env::current_dir()?;
    tracing::debug!(command = command.name(), cwd = %cwd.display(), "dispatching");
    execute_command(command, &cwd)
}

fn execute_command(command: Commands, cwd: &Path) -> Result<()> {
    match command {
        Commands::Init { url, dir, revset } => {
            commands::run_init(cwd, &url, dir.as_deref(), revset.as_deref())
        }
        Commands::Sync {
            dry_run,
            keep_going,
            json,
        } => commands::run_sync(
            cwd,
            commands::SyncArgs {
                dry_run,
                keep_going,
                json,
            },
        ),
    }
}
