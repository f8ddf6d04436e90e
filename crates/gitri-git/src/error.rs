//! Error types for gitri-git

use std::path::PathBuf;

/// Result type for gitri-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gitri-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] gitri_fs::Error),

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Reference '{name}' not found")]
    RefNotFound { name: String },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Remote '{remote}' did not advertise a default branch")]
    NoDefaultBranch { remote: String },

    #[error("HEAD is detached; a branch is required")]
    DetachedHead,

    #[error("Cannot fast-forward to '{target}'")]
    CannotFastForward { target: String },

    #[error("Checkout would overwrite local changes: {message}")]
    CheckoutConflict { message: String },

    #[error("Rebase of '{upstream}..HEAD' onto '{onto}' stopped on a conflict and was aborted")]
    RebaseConflict { upstream: String, onto: String },
}
