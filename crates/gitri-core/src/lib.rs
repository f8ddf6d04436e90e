//! Manifest model, project discovery, and sync engine for gitri
//!
//! A gitri project is a directory tree holding many independent git
//! repositories, described by a manifest at `.gitri/manifest.xml`. This crate
//! implements:
//!
//! - **Manifest loading**: remotes, defaults, and repository entries parsed
//!   into typed values
//! - **Project discovery**: locating the nearest project root above a directory
//! - **Project initialization**: bootstrapping a project from a manifest repository
//! - **SyncEngine**: bringing each repository up to date with its remote while
//!   keeping unpushed local work
//!
//! # Architecture
//!
//! ```text
//!                    gitri-cli
//!                        |
//!                   gitri-core
//!                        |
//!               +--------+--------+
//!               |                 |
//!           gitri-fs          gitri-git
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gitri_core::{Project, SyncEngine};
//!
//! fn example() -> gitri_core::Result<()> {
//!     let project = Project::find(None)?;
//!     let report = SyncEngine::new().sync(&project)?;
//!     println!("synced {} repositories", report.outcomes.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod manifest;
pub mod project;
pub mod sync;

pub use config::{ProjectConfig, SyncSection};
pub use error::{Error, Result};
pub use manifest::{Manifest, ManifestDefault, Remote, RepoSpec};
pub use project::{Project, default_project_dir};
pub use sync::{
    ORIGIN, PlannedAction, RepoError, RepoOutcome, SkipReason, SyncAction, SyncEngine,
    SyncOptions, SyncReport,
};
