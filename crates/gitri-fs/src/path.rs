//! Slash-normalized paths and project-root confinement

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// A filesystem path stored with `/` separators.
///
/// Manifest paths and project paths are compared and logged in this form;
/// [`NormalizedPath::to_native`] turns it back into a `PathBuf` when the
/// operating system needs one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(forward_slashes(&path.as_ref().to_string_lossy()))
    }

    /// Resolve `path` against the working directory without touching disk.
    ///
    /// Unlike `canonicalize`, the path does not need to exist yet, which is
    /// what `gitri init` needs for its destination. `.` and `..` are folded
    /// away textually, so `a/b/..` resolves to `a`; symlinks are not followed.
    pub fn absolute(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let resolved = std::path::absolute(path).map_err(|e| Error::io(path, e))?;

        let mut folded = PathBuf::new();
        for component in resolved.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    // `..` at the root stays at the root
                    folded.pop();
                }
                other => folded.push(other),
            }
        }
        Ok(Self::new(folded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }

    /// Append a relative segment, which may itself contain separators.
    pub fn join(&self, segment: &str) -> Self {
        let segment = forward_slashes(segment);
        let mut out = String::with_capacity(self.0.len() + segment.len() + 1);
        out.push_str(&self.0);
        if !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(&segment);
        Self(out)
    }

    /// The enclosing directory, or `None` at the filesystem root.
    pub fn parent(&self) -> Option<Self> {
        let body = self.0.trim_end_matches('/');
        let cut = body.rfind('/')?;
        match (cut, body.len()) {
            (0, 1) => None,
            (0, _) => Some(Self("/".to_owned())),
            (cut, _) => Some(Self(body[..cut].to_owned())),
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match self.0.trim_end_matches('/').rsplit('/').next() {
            Some("") | None => None,
            name => name,
        }
    }

    /// Text after the last dot of the file name. Dotfiles have none.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(dot) => Some(&name[dot + 1..]),
        }
    }

    pub fn exists(&self) -> bool {
        Path::new(&self.0).exists()
    }

    pub fn is_file(&self) -> bool {
        Path::new(&self.0).is_file()
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn forward_slashes(raw: &str) -> String {
    raw.replace('\\', "/")
}

/// Check that a manifest `path` attribute stays inside the project root.
///
/// Returns the cleaned relative form: `.` and empty segments are dropped and
/// `..` consumes the previous segment, so `a/./b//c` yields `a/b/c`. Rooted
/// paths, drive letters, and anything that climbs past the root (or cleans
/// down to nothing) yield [`Error::PathEscapesRoot`].
pub fn confine_relative(path: &str) -> Result<String> {
    let cleaned = forward_slashes(path);
    let reject = || Error::PathEscapesRoot {
        path: path.to_owned(),
    };

    let rooted = cleaned.starts_with('/');
    let drive_qualified = cleaned.as_bytes().get(1) == Some(&b':');
    if rooted || drive_qualified {
        return Err(reject());
    }

    let mut kept: Vec<&str> = Vec::new();
    for segment in cleaned.split('/') {
        if segment == ".." {
            if kept.pop().is_none() {
                return Err(reject());
            }
        } else if !segment.is_empty() && segment != "." {
            kept.push(segment);
        }
    }

    if kept.is_empty() {
        Err(reject())
    } else {
        Ok(kept.join("/"))
    }
}
