//! Sync command implementation

use std::path::Path;

use colored::Colorize;

use gitri_core::{Project, SyncAction, SyncEngine, SyncOptions, SyncReport};

use crate::error::{CliError, Result};

/// Flags of `gitri sync`
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncArgs {
    pub dry_run: bool,
    pub keep_going: bool,
    pub json: bool,
}

/// Run the sync command
///
/// Locates the project at or above `cwd`. `--keep-going` or
/// `[sync] keep_going` in `.gitri/config.toml` enables per-repository
/// error isolation.
pub fn run_sync(cwd: &Path, args: SyncArgs) -> Result<()> {
    let project = Project::find(Some(cwd))?;
    let options = SyncOptions {
        dry_run: args.dry_run,
        keep_going: args.keep_going || project.config().sync.keep_going,
    };

    if !args.json {
        println!(
            "{} Syncing {} repositories in {}",
            "=>".blue().bold(),
            project.repos().len(),
            project.root().to_string().cyan()
        );
    }

    let report = SyncEngine::new().with_options(options).sync(&project)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&project, &report);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::SyncIncomplete {
            failed: report.errors.len(),
            total: project.repos().len(),
        })
    }
}

/// Print one line per repository, then the failures.
pub fn print_report(project: &Project, report: &SyncReport) {
    if report.dry_run {
        println!("{} dry run, nothing was changed", "NOTE".blue().bold());
    }

    for outcome in &report.outcomes {
        let bookmark = outcome
            .bookmark
            .as_deref()
            .map(short_id)
            .unwrap_or_default();
        println!(
            "   {} {} {}",
            outcome.name.bold(),
            describe(&outcome.name, &outcome.action),
            bookmark.dimmed()
        );
    }

    for error in &report.errors {
        println!("   {} {}: {}", "!".red(), error.name.bold(), error.message.red());
    }

    if project.repos().is_empty() {
        println!("   {}", "manifest lists no repositories".dimmed());
    }
}

fn describe(name: &str, action: &SyncAction) -> colored::ColoredString {
    match action {
        SyncAction::Cloned => "cloned".green(),
        SyncAction::UpToDate => "up to date".normal(),
        SyncAction::FastForwarded => "fast-forwarded".green(),
        SyncAction::Rebased => "rebased".cyan(),
        SyncAction::Skipped(reason) => reason.message(name).yellow(),
        SyncAction::Planned(planned) => planned.to_string().blue(),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
