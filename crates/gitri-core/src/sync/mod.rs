//! Per-repository synchronization
//!
//! - **engine**: the decision procedure (clone, fast-forward, rebase, or skip)
//! - **report**: the outcome of a sync run, one entry per repository

mod engine;
mod report;

pub use engine::{ORIGIN, SyncEngine, SyncOptions};
pub use report::{PlannedAction, RepoError, RepoOutcome, SkipReason, SyncAction, SyncReport};
