//! Init command implementation

use std::path::Path;

use colored::Colorize;

use gitri_core::{Project, SyncEngine, default_project_dir};

use super::sync::print_report;
use crate::error::{CliError, Result};

/// Run the init command
///
/// `dir` is resolved against `cwd`; without it the directory is named after
/// the manifest URL.
pub fn run_init(cwd: &Path, url: &str, dir: Option<&str>, revset: Option<&str>) -> Result<()> {
    let dir = match dir {
        Some(dir) => cwd.join(dir),
        None => cwd.join(default_project_dir(url)?),
    };

    println!(
        "{} Initializing {} from {}",
        "=>".blue().bold(),
        dir.display().to_string().cyan(),
        url
    );

    let engine = SyncEngine::new();
    let (project, report) = Project::init(&engine, url, Some(dir.as_path()), revset)?;

    print_report(&project, &report);
    if !report.is_success() {
        return Err(CliError::SyncIncomplete {
            failed: report.errors.len(),
            total: project.repos().len(),
        });
    }

    println!("{} Project ready at {}", "OK".green().bold(), project.root());
    Ok(())
}
