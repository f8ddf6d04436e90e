//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};

/// gitri - keep many git repositories in sync with a manifest
#[derive(Parser, Debug)]
#[command(name = "gitri")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_required = true, arg_required_else_help = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create a project from a manifest repository and sync it
    ///
    /// Examples:
    ///   gitri init https://example.com/manifests.git
    ///   gitri init https://example.com/manifests.git work
    ///   gitri init https://example.com/manifests.git work v2.0
    Init {
        /// URL or path of the manifest repository
        url: String,

        /// Project directory (defaults to the URL's base name)
        dir: Option<String>,

        /// Manifest revision to check out (branch, tag, or commit)
        revset: Option<String>,
    },

    /// Bring every repository of the enclosing project up to date
    Sync {
        /// Report what would happen without cloning, fetching, or moving refs
        #[arg(long)]
        dry_run: bool,

        /// Continue with the next repository when one fails
        #[arg(long)]
        keep_going: bool,

        /// Print the sync report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Sync { .. } => "sync",
        }
    }
}
