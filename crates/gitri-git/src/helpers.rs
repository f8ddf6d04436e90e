//! Shared git2 helper functions for sync operations
//!
//! These functions encapsulate the git2 patterns behind [`crate::Git2Repo`].

use git2::{
    Commit, Direction, ErrorClass, ErrorCode, Oid, RebaseOptions, Repository, Signature, StatusOptions,
    build::{CheckoutBuilder, RepoBuilder},
};
use gitri_fs::NormalizedPath;

use crate::{Error, Result};

/// Resolve a revision spec (ref shorthand, full ref, or commit id) to a commit.
pub fn resolve_commit<'r>(repo: &'r Repository, spec: &str) -> Result<Commit<'r>> {
    let object = repo.revparse_single(spec).map_err(|e| match e.code() {
        ErrorCode::NotFound | ErrorCode::InvalidSpec | ErrorCode::Ambiguous => Error::RefNotFound {
            name: spec.to_string(),
        },
        _ => Error::Git(e),
    })?;
    Ok(object.peel_to_commit()?)
}

/// Like [`resolve_commit`], but a missing ref yields `None`.
pub fn resolve_commit_optional<'r>(repo: &'r Repository, spec: &str) -> Result<Option<Commit<'r>>> {
    match resolve_commit(repo, spec) {
        Ok(commit) => Ok(Some(commit)),
        Err(Error::RefNotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Commit id HEAD points at.
pub fn head_oid(repo: &Repository) -> Result<Oid> {
    Ok(repo.head()?.peel_to_commit()?.id())
}

/// Whether `descendant` is `ancestor` or reachable from it through parents.
pub fn is_same_or_descendant(repo: &Repository, descendant: Oid, ancestor: Oid) -> Result<bool> {
    Ok(descendant == ancestor || repo.graph_descendant_of(descendant, ancestor)?)
}

/// Get the current branch name from a repository.
///
/// Returns the branch name if HEAD points to a branch, or `None` if HEAD is detached.
pub fn get_current_branch(repo: &Repository) -> Result<Option<String>> {
    let head = repo.head()?;

    if head.is_branch() {
        Ok(Some(head.shorthand().unwrap_or("HEAD").to_string()))
    } else {
        Ok(None)
    }
}

/// Whether any tracked file differs from HEAD in the index or working tree.
///
/// Untracked and ignored files do not count.
pub fn has_local_changes(repo: &Repository) -> Result<bool> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(false)
        .include_ignored(false)
        .exclude_submodules(true);

    let statuses = repo.statuses(Some(&mut opts))?;
    Ok(statuses
        .iter()
        .any(|entry| entry.status() != git2::Status::CURRENT))
}

/// Signature for commits created by a rebase.
///
/// Falls back to a fixed identity when the user has none configured.
pub fn signature(repo: &Repository) -> Result<Signature<'static>> {
    match repo.signature() {
        Ok(sig) => Ok(sig.to_owned()),
        Err(_) => Ok(Signature::now("gitri", "gitri@localhost")?),
    }
}

/// Fetch all configured refspecs of a remote.
pub fn fetch(repo: &Repository, remote_name: &str) -> Result<()> {
    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|_| Error::RemoteNotFound {
            name: remote_name.to_string(),
        })?;

    let no_refspecs: &[&str] = &[];
    remote.fetch(no_refspecs, None, None)?;
    Ok(())
}

/// Point `refs/remotes/<remote>/HEAD` at the remote's default branch.
///
/// Equivalent to `git remote set-head <remote> --auto`.
pub fn set_remote_head(repo: &Repository, remote_name: &str) -> Result<()> {
    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|_| Error::RemoteNotFound {
            name: remote_name.to_string(),
        })?;

    remote.connect(Direction::Fetch)?;
    let default_branch = remote.default_branch();
    remote.disconnect()?;

    let default_branch = default_branch.map_err(|_| Error::NoDefaultBranch {
        remote: remote_name.to_string(),
    })?;
    let default_branch = default_branch.as_str().ok_or_else(|| Error::NoDefaultBranch {
        remote: remote_name.to_string(),
    })?;
    let branch = default_branch
        .strip_prefix("refs/heads/")
        .unwrap_or(default_branch);

    let target = format!("refs/remotes/{remote_name}/{branch}");
    repo.reference_symbolic(
        &format!("refs/remotes/{remote_name}/HEAD"),
        &target,
        true,
        "gitri: set remote HEAD",
    )?;

    tracing::debug!(remote = %remote_name, target = %target, "set remote HEAD");
    Ok(())
}

/// Fast-forward the checked-out branch to `target`.
///
/// The target tree is checked out with a safe strategy before the branch
/// moves, so uncommitted edits survive or the merge fails without changes.
pub fn fast_forward(repo: &Repository, target: &str) -> Result<()> {
    let target_commit = resolve_commit(repo, target)?;
    let head_id = head_oid(repo)?;

    if is_same_or_descendant(repo, head_id, target_commit.id())? {
        return Ok(());
    }
    if !repo.graph_descendant_of(target_commit.id(), head_id)? {
        return Err(Error::CannotFastForward {
            target: target.to_string(),
        });
    }

    let mut head = repo.head()?;
    if !head.is_branch() {
        return Err(Error::DetachedHead);
    }

    repo.checkout_tree(
        target_commit.as_object(),
        Some(CheckoutBuilder::new().safe()),
    )
    .map_err(|e| match e.code() {
        ErrorCode::Conflict => Error::CheckoutConflict {
            message: e.message().to_string(),
        },
        _ => Error::Git(e),
    })?;

    head.set_target(
        target_commit.id(),
        &format!("gitri: fast-forward to {target}"),
    )?;

    Ok(())
}

/// Replay the commits in `upstream..HEAD` onto `onto`.
///
/// Commits whose changes are already present upstream are dropped. On a
/// conflict the rebase is aborted, leaving the branch where it was.
pub fn rebase_onto(repo: &Repository, upstream: &str, onto: &str) -> Result<()> {
    let head = repo.head()?;
    if !head.is_branch() {
        return Err(Error::DetachedHead);
    }

    let branch = repo.reference_to_annotated_commit(&head)?;
    let upstream_commit = repo.find_annotated_commit(resolve_commit(repo, upstream)?.id())?;
    let onto_commit = repo.find_annotated_commit(resolve_commit(repo, onto)?.id())?;

    let sig = signature(repo)?;
    let mut opts = RebaseOptions::new();
    let mut rebase = repo.rebase(
        Some(&branch),
        Some(&upstream_commit),
        Some(&onto_commit),
        Some(&mut opts),
    )?;

    let conflict = || Error::RebaseConflict {
        upstream: upstream.to_string(),
        onto: onto.to_string(),
    };

    while let Some(operation) = rebase.next() {
        if let Err(e) = operation {
            rebase.abort()?;
            return Err(if is_conflict(&e) { conflict() } else { Error::Git(e) });
        }

        // The step wrote its merge result to disk; the cached index is stale
        let mut index = repo.index()?;
        index.read(true)?;
        if index.has_conflicts() {
            rebase.abort()?;
            return Err(conflict());
        }

        match rebase.commit(None, &sig, None) {
            Ok(_) => {}
            // Patch already upstream; nothing to commit for this step
            Err(e) if e.code() == ErrorCode::Applied => {}
            Err(e) => {
                rebase.abort()?;
                return Err(if is_conflict(&e) { conflict() } else { Error::Git(e) });
            }
        }
    }

    rebase.finish(Some(&sig))?;
    Ok(())
}

fn is_conflict(e: &git2::Error) -> bool {
    matches!(
        e.code(),
        ErrorCode::Conflict | ErrorCode::MergeConflict | ErrorCode::Unmerged
    ) || e.class() == ErrorClass::Rebase
}

/// Clone `url` into `dest` under the remote name `remote_name`.
pub fn clone_with_remote(url: &str, dest: &NormalizedPath, remote_name: &str) -> Result<Repository> {
    let native = dest.to_native();
    if let Some(parent) = native.parent() {
        std::fs::create_dir_all(parent).map_err(|e| gitri_fs::Error::io(parent, e))?;
    }

    let mut builder = RepoBuilder::new();
    builder.remote_create(move |repo, _name, url| repo.remote(remote_name, url));

    Ok(builder.clone(url, &native)?)
}

/// Resolve a clone revision: a remote branch first, then a tag or commit id.
pub fn resolve_revision<'r>(
    repo: &'r Repository,
    remote_name: &str,
    revision: &str,
) -> Result<(Commit<'r>, bool)> {
    if let Some(commit) = resolve_commit_optional(repo, &format!("{remote_name}/{revision}"))? {
        return Ok((commit, true));
    }
    Ok((resolve_commit(repo, revision)?, false))
}

/// Check out `commit` on a new local branch `name` (overwriting any stale one).
pub fn checkout_new_branch(repo: &Repository, name: &str, commit: &Commit<'_>) -> Result<()> {
    repo.branch(name, commit, true)?;
    repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().safe()))?;
    repo.set_head(&format!("refs/heads/{name}"))?;
    Ok(())
}
