//! git2-backed implementation of the backend traits

use git2::Repository;
use gitri_fs::NormalizedPath;

use crate::{
    CloneRequest, Error, RepoHandle, Result, VcsBackend,
    helpers::{self, head_oid, is_same_or_descendant, resolve_commit, resolve_commit_optional},
};

/// Production backend that links libgit2 through `git2`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Backend;

impl Git2Backend {
    pub fn new() -> Self {
        Self
    }

    fn open_repo(&self, path: &NormalizedPath) -> Result<Git2Repo> {
        let repo = Repository::open(path.to_native()).map_err(|_| Error::NotARepository {
            path: path.to_native(),
        })?;
        Ok(Git2Repo {
            path: path.clone(),
            repo,
        })
    }
}

impl VcsBackend for Git2Backend {
    fn is_valid_repo(&self, path: &NormalizedPath) -> bool {
        // `open` does not search parent directories, so a project nested
        // inside another checkout is not mistaken for a repository.
        Repository::open(path.to_native()).is_ok()
    }

    fn open(&self, path: &NormalizedPath) -> Result<Box<dyn RepoHandle>> {
        Ok(Box::new(self.open_repo(path)?))
    }

    fn clone_repo(&self, request: &CloneRequest<'_>) -> Result<Box<dyn RepoHandle>> {
        let remote_name = request.remote.unwrap_or("origin");
        tracing::debug!(
            url = %request.url,
            dest = %request.dest,
            remote = %remote_name,
            revision = ?request.revision,
            "cloning"
        );

        let repo = helpers::clone_with_remote(request.url, request.dest, remote_name)?;
        if let Err(e) = helpers::set_remote_head(&repo, remote_name) {
            tracing::warn!(remote = %remote_name, error = %e, "could not record remote HEAD after clone");
        }

        {
            let (commit, is_branch) = match request.revision {
                Some(revision) => helpers::resolve_revision(&repo, remote_name, revision)?,
                None => (repo.head()?.peel_to_commit()?, true),
            };

            match (request.local_branch, request.revision) {
                (Some(local_branch), _) => {
                    helpers::checkout_new_branch(&repo, local_branch, &commit)?;
                }
                (None, Some(revision)) if is_branch => {
                    if helpers::get_current_branch(&repo)?.as_deref() != Some(revision) {
                        helpers::checkout_new_branch(&repo, revision, &commit)?;
                    }
                }
                (None, Some(_)) => {
                    repo.checkout_tree(
                        commit.as_object(),
                        Some(git2::build::CheckoutBuilder::new().safe()),
                    )?;
                    repo.set_head_detached(commit.id())?;
                }
                (None, None) => {}
            }
        }

        Ok(Box::new(Git2Repo {
            path: request.dest.clone(),
            repo,
        }))
    }
}

/// An opened git repository.
pub struct Git2Repo {
    path: NormalizedPath,
    repo: Repository,
}

impl RepoHandle for Git2Repo {
    fn path(&self) -> &NormalizedPath {
        &self.path
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        helpers::fetch(&self.repo, remote)
    }

    fn set_remote_head(&self, remote: &str) -> Result<()> {
        helpers::set_remote_head(&self.repo, remote)
    }

    fn current_branch(&self) -> Result<String> {
        Ok(helpers::get_current_branch(&self.repo)?.unwrap_or_else(|| "HEAD".to_string()))
    }

    fn is_up_to_date(&self, target: &str) -> Result<bool> {
        let target = resolve_commit(&self.repo, target)?.id();
        is_same_or_descendant(&self.repo, head_oid(&self.repo)?, target)
    }

    fn can_fast_forward(&self, target: &str) -> Result<bool> {
        let target = resolve_commit(&self.repo, target)?.id();
        let head = head_oid(&self.repo)?;
        Ok(target != head && self.repo.graph_descendant_of(target, head)?)
    }

    fn is_descendant_of(&self, ancestor: &str) -> Result<bool> {
        match resolve_commit_optional(&self.repo, ancestor)? {
            Some(ancestor) => {
                is_same_or_descendant(&self.repo, head_oid(&self.repo)?, ancestor.id())
            }
            None => Ok(false),
        }
    }

    fn is_dirty(&self) -> Result<bool> {
        helpers::has_local_changes(&self.repo)
    }

    fn merge(&self, target: &str) -> Result<()> {
        helpers::fast_forward(&self.repo, target)
    }

    fn rebase(&self, upstream: &str, onto: &str) -> Result<()> {
        helpers::rebase_onto(&self.repo, upstream, onto)
    }

    fn update_ref(&self, name: &str, commit: &str) -> Result<()> {
        let oid = resolve_commit(&self.repo, commit)?.id();
        self.repo.reference(name, oid, true, "gitri: sync bookmark")?;
        Ok(())
    }

    fn head_commit(&self) -> Result<String> {
        Ok(head_oid(&self.repo)?.to_string())
    }
}
