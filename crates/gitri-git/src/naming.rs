//! Names of the refs a sync creates and reads.
//!
//! These strings are shared with existing synced trees and must not change:
//!
//! - local sync branch: `gitri/<origin>/<revset>`
//! - bookmark ref: `refs/bookmarks/<origin>/<revset>`
//! - remote tracking ref: `<remote>/<revision or HEAD>`

/// Prefix of every local sync branch.
pub const SYNC_BRANCH_PREFIX: &str = "gitri";

/// Namespace holding bookmark refs.
pub const BOOKMARK_NAMESPACE: &str = "refs/bookmarks";

/// Local branch a repository sits on while synced under `revset`.
pub fn sync_branch_name(origin: &str, revset: &str) -> String {
    format!("{SYNC_BRANCH_PREFIX}/{origin}/{revset}")
}

/// Ref recording HEAD at the end of the last sync under `revset`.
pub fn bookmark_ref_name(origin: &str, revset: &str) -> String {
    format!("{BOOKMARK_NAMESPACE}/{origin}/{revset}")
}

/// Remote ref a repository is synced against.
pub fn remote_tracking_ref(remote: &str, revision: Option<&str>) -> String {
    format!("{}/{}", remote, revision.unwrap_or("HEAD"))
}

/// The three refs involved in syncing one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRefs {
    sync_branch: String,
    bookmark_ref: String,
    remote_tracking_ref: String,
}

impl SyncRefs {
    pub fn new(origin: &str, revset: &str, remote: &str, revision: Option<&str>) -> Self {
        Self {
            sync_branch: sync_branch_name(origin, revset),
            bookmark_ref: bookmark_ref_name(origin, revset),
            remote_tracking_ref: remote_tracking_ref(remote, revision),
        }
    }

    pub fn sync_branch(&self) -> &str {
        &self.sync_branch
    }

    pub fn bookmark_ref(&self) -> &str {
        &self.bookmark_ref
    }

    pub fn remote_tracking_ref(&self) -> &str {
        &self.remote_tracking_ref
    }
}
