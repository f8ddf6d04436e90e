//! Sync report types

use serde::Serialize;

/// Why a repository was left alone.
///
/// Skips are diagnostics, not failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The repository is not on the sync branch of the current revset
    ChangedBranch { found: String, expected: String },
    /// A rebase is needed but tracked files have uncommitted changes
    DirtyWorkingTree,
    /// Neither a fast-forward nor a continuation of the last sync point
    Diverged { target: String },
}

impl SkipReason {
    /// Diagnostic line for the repository `repo`.
    pub fn message(&self, repo: &str) -> String {
        match self {
            Self::ChangedBranch { .. } => {
                format!("{repo} has changed branches and cannot be safely synced; skipping")
            }
            Self::DirtyWorkingTree => {
                format!("{repo} has local changes and cannot be rebased; skipping")
            }
            Self::Diverged { target } => format!(
                "{repo} has diverged from {target} and cannot be synced automatically; skipping"
            ),
        }
    }
}

/// What a dry run would have done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PlannedAction {
    Clone { url: String, branch: String },
    FastForward { target: String },
    Rebase { upstream: String, onto: String },
}

impl std::fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clone { url, branch } => write!(f, "would clone {url} on {branch}"),
            Self::FastForward { target } => write!(f, "would fast-forward to {target}"),
            Self::Rebase { upstream, onto } => {
                write!(f, "would rebase {upstream}..HEAD onto {onto}")
            }
        }
    }
}

/// Result of the decision procedure for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "detail", rename_all = "snake_case")]
pub enum SyncAction {
    Cloned,
    UpToDate,
    FastForwarded,
    Rebased,
    Skipped(SkipReason),
    Planned(PlannedAction),
}

impl SyncAction {
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

/// One processed repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoOutcome {
    pub name: String,
    pub path: String,
    #[serde(flatten)]
    pub action: SyncAction,
    /// Commit the bookmark ref was set to; `None` on a dry run
    pub bookmark: Option<String>,
}

/// A repository whose sync failed while `keep_going` was set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoError {
    pub name: String,
    pub path: String,
    pub message: String,
}

/// Outcome of a whole sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Manifest revision the run synced against
    pub revset: String,
    pub dry_run: bool,
    /// Processed repositories in manifest order
    pub outcomes: Vec<RepoOutcome>,
    pub errors: Vec<RepoError>,
}

impl SyncReport {
    pub fn new(revset: impl Into<String>, dry_run: bool) -> Self {
        Self {
            revset: revset.into(),
            dry_run,
            outcomes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// True when no repository failed. Skips do not count as failures.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn outcome(&self, name: &str) -> Option<&RepoOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &RepoOutcome> {
        self.outcomes.iter().filter(|o| o.action.is_skip())
    }
}
