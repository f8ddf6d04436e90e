//! SyncEngine implementation
//!
//! Brings every repository of a project into agreement with its remote. For
//! each repository, in manifest order:
//!
//! ```text
//! not a repository      -> clone on gitri/<origin>/<revset>
//! on another branch     -> skip (ChangedBranch), nothing fetched
//! remote ref in HEAD    -> up to date
//! HEAD behind remote    -> fast-forward
//! HEAD past bookmark    -> rebase bookmark..HEAD onto remote (skip if dirty)
//! otherwise             -> skip (Diverged)
//! ```
//!
//! The bookmark ref is then set to HEAD.

use gitri_fs::ProjectLock;
use gitri_git::{CloneRequest, Git2Backend, RepoHandle, SyncRefs, VcsBackend};

use super::report::{PlannedAction, RepoError, RepoOutcome, SkipReason, SyncAction, SyncReport};
use crate::manifest::RepoSpec;
use crate::project::Project;
use crate::{Error, Result};

/// Label of the manifest's own remote, used in sync branch and bookmark names.
pub const ORIGIN: &str = "origin";

/// Options for a sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Compute and report decisions without cloning, fetching, or moving refs
    pub dry_run: bool,
    /// Record a failing repository in the report and continue with the next
    pub keep_going: bool,
}

/// Engine driving the per-repository decision procedure against a backend.
pub struct SyncEngine {
    backend: Box<dyn VcsBackend>,
    options: SyncOptions,
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncEngine {
    /// Engine backed by git2.
    pub fn new() -> Self {
        Self::with_backend(Box::new(Git2Backend::new()))
    }

    pub fn with_backend(backend: Box<dyn VcsBackend>) -> Self {
        Self {
            backend,
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    pub fn backend(&self) -> &dyn VcsBackend {
        self.backend.as_ref()
    }

    /// Current head commit of the project's manifest repository.
    pub fn revset(&self, project: &Project) -> Result<String> {
        let path = project.manifest_repo_path();
        if !self.backend.is_valid_repo(&path) {
            return Err(Error::ManifestRepoMissing {
                path: path.to_native(),
            });
        }
        Ok(self.backend.open(&path)?.head_commit()?)
    }

    /// Sync every repository of `project`.
    ///
    /// Holds the project lock for the whole run. The revset is read once,
    /// before the first repository. Without `keep_going` the first failing
    /// repository aborts the run.
    pub fn sync(&self, project: &Project) -> Result<SyncReport> {
        let _lock = ProjectLock::try_acquire(&project.lock_path())?;

        let revset = self.revset(project)?;
        tracing::info!(
            root = %project.root(),
            revset = %revset,
            dry_run = self.options.dry_run,
            "syncing project"
        );

        let mut report = SyncReport::new(revset.as_str(), self.options.dry_run);
        for spec in project.repos() {
            match self.sync_repo(project, spec, &revset) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) if self.options.keep_going => {
                    tracing::error!(repo = %spec.name, error = %e, "sync failed, continuing");
                    report.errors.push(RepoError {
                        name: spec.name.clone(),
                        path: project.repo_path(spec).to_string(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    return Err(Error::RepoSync {
                        repo: spec.name.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }

        Ok(report)
    }

    fn sync_repo(&self, project: &Project, spec: &RepoSpec, revset: &str) -> Result<RepoOutcome> {
        let path = project.repo_path(spec);
        let refs = SyncRefs::new(ORIGIN, revset, &spec.remote, spec.revision.as_deref());
        let outcome = |action: SyncAction, bookmark: Option<String>| RepoOutcome {
            name: spec.name.clone(),
            path: path.to_string(),
            action,
            bookmark,
        };

        if !self.backend.is_valid_repo(&path) {
            let remote = project
                .manifest()
                .remote(&spec.remote)
                .ok_or_else(|| Error::UnknownRemote {
                    repo: spec.name.clone(),
                    remote: spec.remote.clone(),
                })?;
            let url = remote.repo_url(&spec.name);

            if self.options.dry_run {
                let planned = PlannedAction::Clone {
                    url,
                    branch: refs.sync_branch().to_string(),
                };
                tracing::info!(repo = %spec.name, "{}", planned);
                return Ok(outcome(SyncAction::Planned(planned), None));
            }

            tracing::info!(repo = %spec.name, url = %url, path = %path, "cloning");
            let repo = self.backend.clone_repo(&CloneRequest {
                url: &url,
                dest: &path,
                remote: Some(&spec.remote),
                revision: spec.revision.as_deref(),
                local_branch: Some(refs.sync_branch()),
            })?;
            let bookmark = record_bookmark(repo.as_ref(), &refs)?;
            return Ok(outcome(SyncAction::Cloned, Some(bookmark)));
        }

        let repo = self.backend.open(&path)?;
        let action = self.decide(repo.as_ref(), spec, &refs)?;
        match &action {
            SyncAction::Skipped(reason) => {
                tracing::warn!(repo = %spec.name, "{}", reason.message(&spec.name))
            }
            SyncAction::Planned(planned) => tracing::info!(repo = %spec.name, "{}", planned),
            other => tracing::info!(repo = %spec.name, action = ?other, "synced"),
        }

        if self.options.dry_run {
            return Ok(outcome(action, None));
        }

        // Skipped repositories get their bookmark moved too, so the bookmark
        // records the last observed HEAD rather than the last successful sync.
        let bookmark = record_bookmark(repo.as_ref(), &refs)?;
        Ok(outcome(action, Some(bookmark)))
    }

    fn decide(&self, repo: &dyn RepoHandle, spec: &RepoSpec, refs: &SyncRefs) -> Result<SyncAction> {
        let branch = repo.current_branch()?;
        if branch != refs.sync_branch() {
            return Ok(SyncAction::Skipped(SkipReason::ChangedBranch {
                found: branch,
                expected: refs.sync_branch().to_string(),
            }));
        }

        if !self.options.dry_run {
            repo.fetch(&spec.remote)?;
            repo.set_remote_head(&spec.remote)?;
        }

        let target = refs.remote_tracking_ref();
        if repo.is_up_to_date(target)? {
            tracing::debug!(repo = %spec.name, target, "remote already contained in HEAD");
            return Ok(SyncAction::UpToDate);
        }

        if repo.can_fast_forward(target)? {
            if self.options.dry_run {
                return Ok(SyncAction::Planned(PlannedAction::FastForward {
                    target: target.to_string(),
                }));
            }
            repo.merge(target)?;
            return Ok(SyncAction::FastForwarded);
        }

        let bookmark = refs.bookmark_ref();
        if repo.is_descendant_of(bookmark)? {
            if repo.is_dirty()? {
                return Ok(SyncAction::Skipped(SkipReason::DirtyWorkingTree));
            }
            if self.options.dry_run {
                return Ok(SyncAction::Planned(PlannedAction::Rebase {
                    upstream: bookmark.to_string(),
                    onto: target.to_string(),
                }));
            }
            repo.rebase(bookmark, target)?;
            return Ok(SyncAction::Rebased);
        }

        tracing::debug!(repo = %spec.name, target, bookmark, "no common sync point");
        Ok(SyncAction::Skipped(SkipReason::Diverged {
            target: target.to_string(),
        }))
    }
}

fn record_bookmark(repo: &dyn RepoHandle, refs: &SyncRefs) -> Result<String> {
    let head = repo.head_commit()?;
    repo.update_ref(refs.bookmark_ref(), &head)?;
    tracing::debug!(bookmark = refs.bookmark_ref(), head = %head, "updated bookmark");
    Ok(head)
}
