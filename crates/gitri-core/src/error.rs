//! Error types for gitri-core

use std::path::PathBuf;

/// Result type for gitri-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gitri-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Manifest document is not well-formed or lacks its root element
    #[error("Malformed manifest {location}: {message}")]
    MalformedManifest { location: String, message: String },

    /// Two `remote` elements share a name
    #[error("Duplicate remote '{name}' in manifest")]
    DuplicateRemote { name: String },

    /// Two repository entries share a name
    #[error("Duplicate repository '{name}' in manifest")]
    DuplicateRepo { name: String },

    /// Two repository entries would be checked out at the same path
    #[error("Duplicate repository path '{path}' in manifest")]
    DuplicatePath { path: String },

    /// A repository refers to a remote the manifest does not declare
    #[error("Repository '{repo}' uses undeclared remote '{remote}'")]
    UnknownRemote { repo: String, remote: String },

    /// A required attribute is absent even after defaults are applied
    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    /// A repository path is absolute or climbs out of the project root
    #[error("Repository '{repo}' has path '{path}' outside the project root")]
    InvalidRepoPath { repo: String, path: String },

    /// No directory at or above the start contains `.gitri/manifest.xml`
    #[error("Not a valid gitri project: {path}")]
    InvalidProject { path: PathBuf },

    /// Init target already exists
    #[error("Directory already exists: {path}")]
    ProjectAlreadyExists { path: PathBuf },

    /// Cloned manifest source has no `default.xml`
    #[error("Invalid manifest repository at {path}: no default.xml")]
    InvalidManifestRepo { path: PathBuf },

    /// `.gitri/manifest` is not a repository, so no revset can be derived
    #[error("Manifest repository missing at {path}")]
    ManifestRepoMissing { path: PathBuf },

    /// A project directory name could not be derived from the URL
    #[error("Cannot derive a project directory from '{url}'")]
    InvalidUrl { url: String },

    /// A repository failed to sync
    #[error("Failed to sync {repo}: {source}")]
    RepoSync {
        repo: String,
        #[source]
        source: Box<Error>,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from gitri-fs
    #[error(transparent)]
    Fs(#[from] gitri_fs::Error),

    /// Backend error from gitri-git
    #[error(transparent)]
    Git(#[from] gitri_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
