//! In-memory version-control backend.
//!
//! [`FakeBackend`] keeps a commit graph, a set of upstream repositories keyed
//! by URL, and a set of working copies keyed by path. Tests build the
//! situation they need (new upstream commits, local commits, dirty trees,
//! branch switches) and then inspect refs and the operation log.
//!
//! Cloning writes the upstream's files to the destination directory, so a
//! fake manifest repository can supply a real `default.xml`.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::sync::{Arc, Mutex, MutexGuard};

use gitri_fs::NormalizedPath;
use gitri_git::{CloneRequest, Error, RepoHandle, Result, VcsBackend};

/// A mutating call made against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeOp {
    Clone { url: String, path: String },
    Fetch { path: String, remote: String },
    SetRemoteHead { path: String, remote: String },
    Merge { path: String, target: String },
    Rebase { path: String, upstream: String, onto: String },
    UpdateRef { path: String, name: String, commit: String },
}

impl FakeOp {
    pub fn path(&self) -> &str {
        match self {
            Self::Clone { path, .. }
            | Self::Fetch { path, .. }
            | Self::SetRemoteHead { path, .. }
            | Self::Merge { path, .. }
            | Self::Rebase { path, .. }
            | Self::UpdateRef { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone)]
struct Commit {
    parents: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct Upstream {
    default_branch: String,
    branches: BTreeMap<String, String>,
    tags: BTreeMap<String, String>,
    files: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Head {
    Branch(String),
    Detached(String),
}

#[derive(Debug, Clone)]
struct WorkingCopy {
    /// remote name -> URL
    remotes: BTreeMap<String, String>,
    head: Head,
    branches: BTreeMap<String, String>,
    /// Full ref names other than local branches
    refs: BTreeMap<String, String>,
    /// remote name -> default branch
    remote_heads: BTreeMap<String, String>,
    dirty: bool,
}

#[derive(Debug, Default)]
struct State {
    commits: BTreeMap<String, Commit>,
    next_commit: usize,
    upstreams: BTreeMap<String, Upstream>,
    repos: BTreeMap<String, WorkingCopy>,
    ops: Vec<FakeOp>,
    /// (path, operation name) pairs that fail
    failures: HashSet<(String, String)>,
}

impl State {
    fn new_commit(&mut self, parents: Vec<String>) -> String {
        self.next_commit += 1;
        let id = format!("{:040x}", self.next_commit);
        self.commits.insert(id.clone(), Commit { parents });
        id
    }

    /// True when `ancestor` is `descendant` or reachable from it.
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        let mut stack = vec![descendant.to_string()];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == ancestor {
                return true;
            }
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&id) {
                stack.extend(commit.parents.iter().cloned());
            }
        }
        false
    }

    fn upstream(&self, url: &str) -> Result<&Upstream> {
        self.upstreams.get(url).ok_or_else(|| Error::RemoteNotFound {
            name: url.to_string(),
        })
    }

    fn repo(&self, path: &str) -> Result<&WorkingCopy> {
        self.repos.get(path).ok_or_else(|| Error::NotARepository { path: path.into() })
    }

    fn repo_mut(&mut self, path: &str) -> Result<&mut WorkingCopy> {
        self.repos
            .get_mut(path)
            .ok_or_else(|| Error::NotARepository { path: path.into() })
    }

    fn check_failure(&self, path: &str, op: &str) -> Result<()> {
        if self.failures.contains(&(path.to_string(), op.to_string())) {
            return Err(Error::RefNotFound {
                name: format!("injected {op} failure"),
            });
        }
        Ok(())
    }

    fn head_of(&self, path: &str) -> Result<String> {
        let repo = self.repo(path)?;
        match &repo.head {
            Head::Detached(id) => Ok(id.clone()),
            Head::Branch(name) => repo
                .branches
                .get(name)
                .cloned()
                .ok_or_else(|| Error::RefNotFound { name: name.clone() }),
        }
    }

    fn resolve(&self, path: &str, name: &str) -> Result<String> {
        self.resolve_optional(path, name)?
            .ok_or_else(|| Error::RefNotFound {
                name: name.to_string(),
            })
    }

    fn resolve_optional(&self, path: &str, name: &str) -> Result<Option<String>> {
        let repo = self.repo(path)?;
        if name == "HEAD" {
            return self.head_of(path).map(Some);
        }
        if let Some(id) = repo.refs.get(name) {
            return Ok(Some(id.clone()));
        }
        if let Some(branch) = name.strip_prefix("refs/heads/") {
            return Ok(repo.branches.get(branch).cloned());
        }
        if let Some(id) = repo.branches.get(name) {
            return Ok(Some(id.clone()));
        }
        if let Some((remote, branch)) = name.split_once('/') {
            let branch = if branch == "HEAD" {
                match repo.remote_heads.get(remote) {
                    Some(default) => default.as_str(),
                    None => return Ok(None),
                }
            } else {
                branch
            };
            if let Some(id) = repo.refs.get(&format!("refs/remotes/{remote}/{branch}")) {
                return Ok(Some(id.clone()));
            }
        }
        if self.commits.contains_key(name) {
            return Ok(Some(name.to_string()));
        }
        Ok(None)
    }

    fn move_head(&mut self, path: &str, commit: String) -> Result<()> {
        let repo = self.repo_mut(path)?;
        match repo.head.clone() {
            Head::Branch(name) => {
                repo.branches.insert(name, commit);
            }
            Head::Detached(_) => repo.head = Head::Detached(commit),
        }
        Ok(())
    }
}

/// In-memory [`VcsBackend`].
///
/// Clones of a `FakeBackend` share state, so a test can keep one handle while
/// the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register an upstream at `url` whose `default_branch` holds one commit.
    ///
    /// Returns that commit.
    pub fn add_upstream(&self, url: &str, default_branch: &str) -> String {
        let mut state = self.lock();
        let root = state.new_commit(Vec::new());
        let mut upstream = Upstream {
            default_branch: default_branch.to_string(),
            ..Default::default()
        };
        upstream
            .branches
            .insert(default_branch.to_string(), root.clone());
        state.upstreams.insert(url.to_string(), upstream);
        root
    }

    /// Add a file that clones of `url` write to their working directory.
    pub fn add_upstream_file(&self, url: &str, name: &str, content: &str) {
        let mut state = self.lock();
        let upstream = state
            .upstreams
            .get_mut(url)
            .unwrap_or_else(|| panic!("unknown upstream {url}"));
        upstream.files.insert(name.to_string(), content.to_string());
    }

    /// Add a commit on `branch` of `url`, creating the branch from the
    /// default branch if needed. Returns the new commit.
    pub fn push_upstream(&self, url: &str, branch: &str) -> String {
        let mut state = self.lock();
        let upstream = state
            .upstreams
            .get(url)
            .unwrap_or_else(|| panic!("unknown upstream {url}"));
        let parent = upstream
            .branches
            .get(branch)
            .or_else(|| upstream.branches.get(&upstream.default_branch))
            .cloned()
            .unwrap_or_else(|| panic!("upstream {url} has no commits"));
        let commit = state.new_commit(vec![parent]);
        if let Some(upstream) = state.upstreams.get_mut(url) {
            upstream.branches.insert(branch.to_string(), commit.clone());
        }
        commit
    }

    /// Tag `commit` as `tag` on `url`.
    pub fn tag_upstream(&self, url: &str, tag: &str, commit: &str) {
        let mut state = self.lock();
        let upstream = state
            .upstreams
            .get_mut(url)
            .unwrap_or_else(|| panic!("unknown upstream {url}"));
        upstream.tags.insert(tag.to_string(), commit.to_string());
    }

    /// Register an existing working copy at `path` with a single commit on
    /// `branch` and no remotes. Returns the commit.
    pub fn add_local_repo(&self, path: &NormalizedPath, branch: &str) -> String {
        let mut state = self.lock();
        let commit = state.new_commit(Vec::new());
        let mut branches = BTreeMap::new();
        branches.insert(branch.to_string(), commit.clone());
        state.repos.insert(
            path.as_str().to_string(),
            WorkingCopy {
                remotes: BTreeMap::new(),
                head: Head::Branch(branch.to_string()),
                branches,
                refs: BTreeMap::new(),
                remote_heads: BTreeMap::new(),
                dirty: false,
            },
        );
        commit
    }

    /// Commit on the checked-out branch of the working copy at `path`.
    pub fn commit_local(&self, path: &NormalizedPath) -> String {
        let mut state = self.lock();
        let head = state
            .head_of(path.as_str())
            .unwrap_or_else(|e| panic!("commit_local: {e}"));
        let commit = state.new_commit(vec![head]);
        state
            .move_head(path.as_str(), commit.clone())
            .unwrap_or_else(|e| panic!("commit_local: {e}"));
        commit
    }

    pub fn set_dirty(&self, path: &NormalizedPath, dirty: bool) {
        let mut state = self.lock();
        state
            .repo_mut(path.as_str())
            .unwrap_or_else(|e| panic!("set_dirty: {e}"))
            .dirty = dirty;
    }

    /// Create `branch` at HEAD (if missing) and check it out.
    pub fn checkout_branch(&self, path: &NormalizedPath, branch: &str) {
        let mut state = self.lock();
        let head = state
            .head_of(path.as_str())
            .unwrap_or_else(|e| panic!("checkout_branch: {e}"));
        let repo = state
            .repo_mut(path.as_str())
            .unwrap_or_else(|e| panic!("checkout_branch: {e}"));
        repo.branches.entry(branch.to_string()).or_insert(head);
        repo.head = Head::Branch(branch.to_string());
    }

    /// Make every later call of `op` on the working copy at `path` fail.
    ///
    /// `op` is a [`RepoHandle`] method name such as `"fetch"` or `"rebase"`.
    pub fn fail_on(&self, path: &NormalizedPath, op: &str) {
        self.lock()
            .failures
            .insert((path.as_str().to_string(), op.to_string()));
    }

    /// Commit HEAD resolves to in the working copy at `path`.
    pub fn head(&self, path: &NormalizedPath) -> String {
        self.lock()
            .head_of(path.as_str())
            .unwrap_or_else(|e| panic!("head: {e}"))
    }

    /// Checked-out branch at `path`, or `"HEAD"` when detached.
    pub fn branch(&self, path: &NormalizedPath) -> String {
        let state = self.lock();
        match &state.repo(path.as_str()).unwrap_or_else(|e| panic!("branch: {e}")).head {
            Head::Branch(name) => name.clone(),
            Head::Detached(_) => "HEAD".to_string(),
        }
    }

    /// Commit `name` resolves to at `path`, if any.
    pub fn ref_target(&self, path: &NormalizedPath, name: &str) -> Option<String> {
        self.lock()
            .resolve_optional(path.as_str(), name)
            .unwrap_or_else(|e| panic!("ref_target: {e}"))
    }

    /// True when `ancestor` is `descendant` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        self.lock().is_ancestor(ancestor, descendant)
    }

    /// Every mutating call so far, in order.
    pub fn ops(&self) -> Vec<FakeOp> {
        self.lock().ops.clone()
    }

    /// Mutating calls against the working copy at `path`.
    pub fn ops_for(&self, path: &NormalizedPath) -> Vec<FakeOp> {
        self.lock()
            .ops
            .iter()
            .filter(|op| op.path() == path.as_str())
            .cloned()
            .collect()
    }

    pub fn clear_ops(&self) {
        self.lock().ops.clear();
    }
}

impl VcsBackend for FakeBackend {
    fn is_valid_repo(&self, path: &NormalizedPath) -> bool {
        self.lock().repos.contains_key(path.as_str())
    }

    fn open(&self, path: &NormalizedPath) -> Result<Box<dyn RepoHandle>> {
        self.lock().repo(path.as_str())?;
        Ok(Box::new(FakeRepo {
            path: path.clone(),
            state: Arc::clone(&self.state),
        }))
    }

    fn clone_repo(&self, request: &CloneRequest<'_>) -> Result<Box<dyn RepoHandle>> {
        let mut state = self.lock();
        let key = request.dest.as_str().to_string();
        state.check_failure(&key, "clone")?;

        let upstream = state.upstream(request.url)?.clone();
        let remote = request.remote.unwrap_or("origin").to_string();

        let (commit, tracked_branch) = match request.revision {
            None => (
                upstream.branches[&upstream.default_branch].clone(),
                Some(upstream.default_branch.clone()),
            ),
            Some(rev) => {
                if let Some(id) = upstream.branches.get(rev) {
                    (id.clone(), Some(rev.to_string()))
                } else if let Some(id) = upstream.tags.get(rev) {
                    (id.clone(), None)
                } else if state.commits.contains_key(rev) {
                    (rev.to_string(), None)
                } else {
                    return Err(Error::RefNotFound {
                        name: rev.to_string(),
                    });
                }
            }
        };

        let mut branches = BTreeMap::new();
        let head = match (request.local_branch, tracked_branch) {
            (Some(local), _) => {
                branches.insert(local.to_string(), commit.clone());
                Head::Branch(local.to_string())
            }
            (None, Some(branch)) => {
                branches.insert(branch.clone(), commit.clone());
                Head::Branch(branch)
            }
            (None, None) => Head::Detached(commit.clone()),
        };

        let refs = upstream
            .branches
            .iter()
            .map(|(b, id)| (format!("refs/remotes/{remote}/{b}"), id.clone()))
            .collect();
        let mut remotes = BTreeMap::new();
        remotes.insert(remote.clone(), request.url.to_string());
        let mut remote_heads = BTreeMap::new();
        remote_heads.insert(remote, upstream.default_branch.clone());

        let native = request.dest.to_native();
        fs::create_dir_all(&native).map_err(|e| gitri_fs::Error::io(&native, e))?;
        for (name, content) in &upstream.files {
            let file = native.join(name);
            fs::write(&file, content).map_err(|e| gitri_fs::Error::io(&file, e))?;
        }

        state.repos.insert(
            key.clone(),
            WorkingCopy {
                remotes,
                head,
                branches,
                refs,
                remote_heads,
                dirty: false,
            },
        );
        state.ops.push(FakeOp::Clone {
            url: request.url.to_string(),
            path: key,
        });

        Ok(Box::new(FakeRepo {
            path: request.dest.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

/// Handle to one working copy inside a [`FakeBackend`].
pub struct FakeRepo {
    path: NormalizedPath,
    state: Arc<Mutex<State>>,
}

impl FakeRepo {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn key(&self) -> &str {
        self.path.as_str()
    }
}

impl RepoHandle for FakeRepo {
    fn path(&self) -> &NormalizedPath {
        &self.path
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        let mut state = self.lock();
        state.check_failure(self.key(), "fetch")?;
        let url = state
            .repo(self.key())?
            .remotes
            .get(remote)
            .cloned()
            .ok_or_else(|| Error::RemoteNotFound {
                name: remote.to_string(),
            })?;
        let branches = state.upstream(&url)?.branches.clone();

        let repo = state.repo_mut(self.key())?;
        for (branch, id) in branches {
            repo.refs.insert(format!("refs/remotes/{remote}/{branch}"), id);
        }
        state.ops.push(FakeOp::Fetch {
            path: self.key().to_string(),
            remote: remote.to_string(),
        });
        Ok(())
    }

    fn set_remote_head(&self, remote: &str) -> Result<()> {
        let mut state = self.lock();
        state.check_failure(self.key(), "set_remote_head")?;
        let url = state
            .repo(self.key())?
            .remotes
            .get(remote)
            .cloned()
            .ok_or_else(|| Error::RemoteNotFound {
                name: remote.to_string(),
            })?;
        let default = state.upstream(&url)?.default_branch.clone();
        state
            .repo_mut(self.key())?
            .remote_heads
            .insert(remote.to_string(), default);
        state.ops.push(FakeOp::SetRemoteHead {
            path: self.key().to_string(),
            remote: remote.to_string(),
        });
        Ok(())
    }

    fn current_branch(&self) -> Result<String> {
        let state = self.lock();
        Ok(match &state.repo(self.key())?.head {
            Head::Branch(name) => name.clone(),
            Head::Detached(_) => "HEAD".to_string(),
        })
    }

    fn is_up_to_date(&self, target: &str) -> Result<bool> {
        let state = self.lock();
        let target = state.resolve(self.key(), target)?;
        let head = state.head_of(self.key())?;
        Ok(state.is_ancestor(&target, &head))
    }

    fn can_fast_forward(&self, target: &str) -> Result<bool> {
        let state = self.lock();
        let target = state.resolve(self.key(), target)?;
        let head = state.head_of(self.key())?;
        Ok(target != head && state.is_ancestor(&head, &target))
    }

    fn is_descendant_of(&self, ancestor: &str) -> Result<bool> {
        let state = self.lock();
        let Some(ancestor) = state.resolve_optional(self.key(), ancestor)? else {
            return Ok(false);
        };
        let head = state.head_of(self.key())?;
        Ok(state.is_ancestor(&ancestor, &head))
    }

    fn is_dirty(&self) -> Result<bool> {
        Ok(self.lock().repo(self.key())?.dirty)
    }

    fn merge(&self, target: &str) -> Result<()> {
        let mut state = self.lock();
        state.check_failure(self.key(), "merge")?;
        let commit = state.resolve(self.key(), target)?;
        let head = state.head_of(self.key())?;
        if !state.is_ancestor(&head, &commit) {
            return Err(Error::CannotFastForward {
                target: target.to_string(),
            });
        }
        state.move_head(self.key(), commit)?;
        state.ops.push(FakeOp::Merge {
            path: self.key().to_string(),
            target: target.to_string(),
        });
        Ok(())
    }

    fn rebase(&self, upstream: &str, onto: &str) -> Result<()> {
        let mut state = self.lock();
        state.check_failure(self.key(), "rebase")?;
        let base = state.resolve(self.key(), upstream)?;
        let onto_commit = state.resolve(self.key(), onto)?;
        let head = state.head_of(self.key())?;

        // Local commits along the first-parent chain, newest first.
        let mut local = Vec::new();
        let mut cursor = head;
        while !state.is_ancestor(&cursor, &base) {
            let parent = state
                .commits
                .get(&cursor)
                .and_then(|c| c.parents.first().cloned());
            local.push(cursor);
            match parent {
                Some(parent) => cursor = parent,
                None => break,
            }
        }

        let mut tip = onto_commit;
        for _ in local.iter().rev() {
            tip = state.new_commit(vec![tip]);
        }
        state.move_head(self.key(), tip)?;
        state.ops.push(FakeOp::Rebase {
            path: self.key().to_string(),
            upstream: upstream.to_string(),
            onto: onto.to_string(),
        });
        Ok(())
    }

    fn update_ref(&self, name: &str, commit: &str) -> Result<()> {
        let mut state = self.lock();
        state.check_failure(self.key(), "update_ref")?;
        let id = state.resolve(self.key(), commit)?;
        state
            .repo_mut(self.key())?
            .refs
            .insert(name.to_string(), id.clone());
        state.ops.push(FakeOp::UpdateRef {
            path: self.key().to_string(),
            name: name.to_string(),
            commit: id,
        });
        Ok(())
    }

    fn head_commit(&self) -> Result<String> {
        self.lock().head_of(self.key())
    }
}
