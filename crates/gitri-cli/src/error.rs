//! Error types for gitri-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Exit status for a failed command
pub const EXIT_FAILURE: i32 = 1;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from gitri-core
    #[error(transparent)]
    Core(#[from] gitri_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Report serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Sync finished but some repositories failed under `--keep-going`
    #[error("{failed} of {total} repositories failed to sync")]
    SyncIncomplete { failed: usize, total: usize },
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}
