//! Backend traits for version-control operations

use gitri_fs::NormalizedPath;

use crate::Result;

/// Parameters for cloning a repository.
#[derive(Debug, Clone, Copy)]
pub struct CloneRequest<'a> {
    /// URL (or local path) to clone from
    pub url: &'a str,

    /// Directory to create the working copy in
    pub dest: &'a NormalizedPath,

    /// Name for the remote (defaults to "origin" if None)
    pub remote: Option<&'a str>,

    /// Branch, tag, or commit to check out (defaults to the remote's default branch)
    pub revision: Option<&'a str>,

    /// Local branch to create at `revision` and check out
    pub local_branch: Option<&'a str>,
}

/// Entry point for repository access.
///
/// Implementations decide how repositories are stored; the sync engine
/// only ever sees [`RepoHandle`]s.
pub trait VcsBackend: Send + Sync {
    /// Whether `path` holds a repository this backend can open.
    fn is_valid_repo(&self, path: &NormalizedPath) -> bool;

    /// Open an existing repository.
    fn open(&self, path: &NormalizedPath) -> Result<Box<dyn RepoHandle>>;

    /// Clone a repository and return a handle to the new working copy.
    fn clone_repo(&self, request: &CloneRequest<'_>) -> Result<Box<dyn RepoHandle>>;
}

/// Operations on a single opened repository.
///
/// Ref arguments accept anything the backend can resolve: a remote tracking
/// shorthand (`origin/main`), a full ref (`refs/bookmarks/origin/<rev>`), or
/// a commit id. Commit ids are returned as full hex strings.
pub trait RepoHandle {
    /// Working directory of this repository
    fn path(&self) -> &NormalizedPath;

    /// Fetch all configured refspecs of `remote`.
    fn fetch(&self, remote: &str) -> Result<()>;

    /// Point `<remote>/HEAD` at the remote's default branch.
    fn set_remote_head(&self, remote: &str) -> Result<()>;

    /// Short name of the checked-out branch, or `"HEAD"` when detached.
    fn current_branch(&self) -> Result<String>;

    /// True when `target` is HEAD or one of its ancestors.
    fn is_up_to_date(&self, target: &str) -> Result<bool>;

    /// True when `target` strictly descends from HEAD.
    fn can_fast_forward(&self, target: &str) -> Result<bool>;

    /// True when HEAD is `ancestor` or descends from it.
    ///
    /// A missing `ancestor` ref yields `false` rather than an error.
    fn is_descendant_of(&self, ancestor: &str) -> Result<bool>;

    /// True when tracked files differ from HEAD in the index or working tree.
    fn is_dirty(&self) -> Result<bool>;

    /// Fast-forward the current branch to `target`.
    fn merge(&self, target: &str) -> Result<()>;

    /// Replay `upstream..HEAD` onto `onto` and move the current branch there.
    fn rebase(&self, upstream: &str, onto: &str) -> Result<()>;

    /// Create or overwrite the ref `name` to point at `commit`.
    fn update_ref(&self, name: &str, commit: &str) -> Result<()>;

    /// Commit id HEAD resolves to.
    fn head_commit(&self) -> Result<String>;
}
