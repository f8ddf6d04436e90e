//! Project-level lock so only one sync runs per project at a time.

use std::fs::{File, OpenOptions};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// An exclusive advisory lock on a lock file.
///
/// The lock is released when the guard is dropped.
#[derive(Debug)]
pub struct ProjectLock {
    file: File,
    path: NormalizedPath,
}

impl ProjectLock {
    /// Try to take the lock without blocking.
    ///
    /// Fails with [`Error::LockFailed`] when another process (or another
    /// guard in this process) already holds it.
    pub fn try_acquire(path: &NormalizedPath) -> Result<Self> {
        let native = path.to_native();
        if let Some(parent) = native.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&native)
            .map_err(|e| Error::io(&native, e))?;

        file.try_lock_exclusive()
            .map_err(|_| Error::LockFailed { path: native.clone() })?;

        tracing::debug!(path = %path, "acquired project lock");
        Ok(Self {
            file,
            path: path.clone(),
        })
    }

    /// Path of the underlying lock file.
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!(path = %self.path, error = %e, "failed to release project lock");
        }
    }
}
