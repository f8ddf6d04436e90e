//! File reads and crash-safe writes

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Replace the contents of `path` without ever exposing a half-written file.
///
/// The bytes go to a sibling scratch file first, which is flushed to disk and
/// then renamed over the destination. Missing parent directories are created.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let target = path.to_native();
    if let Some(dir) = target.parent() {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }

    let scratch = scratch_path(&target);
    let mut file = File::create(&scratch).map_err(|e| Error::io(&scratch, e))?;

    // Two writers racing on the same destination serialize on the scratch lock
    file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: target.clone(),
    })?;
    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| Error::io(&scratch, e))?;
    drop(file);

    fs::rename(&scratch, &target).map_err(|e| Error::io(&target, e))?;
    tracing::trace!(path = %path, bytes = content.len(), "replaced file");
    Ok(())
}

pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    fs::read_to_string(&native).map_err(|e| Error::io(&native, e))
}

/// Copy `from` to `to` through [`write_atomic`].
pub fn copy_atomic(from: &NormalizedPath, to: &NormalizedPath) -> Result<()> {
    let source = from.to_native();
    let bytes = fs::read(&source).map_err(|e| Error::io(&source, e))?;
    write_atomic(to, &bytes)
}

fn scratch_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{}.partial", std::process::id()))
}
