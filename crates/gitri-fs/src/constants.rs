//! Constants for the gitri project layout.
//!
//! ```text
//! <root>/.gitri/manifest.xml    active manifest
//! <root>/.gitri/manifest/       manifest repository checkout
//! <root>/.gitri/config.toml     optional project configuration
//! <root>/.gitri/sync.lock       held while a sync runs
//! ```

use std::path::Path;

use crate::NormalizedPath;

/// Well-known names inside a gitri project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectPath {
    /// The `.gitri` metadata directory at the project root
    GitriDir,
    /// The active manifest, `manifest.xml`, inside `.gitri`
    ActiveManifest,
    /// The manifest repository checkout, `manifest`, inside `.gitri`
    ManifestRepo,
    /// The manifest a manifest repository must ship, `default.xml`
    DefaultManifest,
    /// Optional project configuration, `config.toml`, inside `.gitri`
    Config,
    /// Lock file held for the duration of a sync
    SyncLock,
}

impl ProjectPath {
    /// Get the string representation of the path component.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitriDir => ".gitri",
            Self::ActiveManifest => "manifest.xml",
            Self::ManifestRepo => "manifest",
            Self::DefaultManifest => "default.xml",
            Self::Config => "config.toml",
            Self::SyncLock => "sync.lock",
        }
    }

    /// Location of this entry under a project root.
    ///
    /// `DefaultManifest` lives inside the manifest repository; everything else
    /// sits directly in `.gitri`.
    pub fn under(&self, root: &NormalizedPath) -> NormalizedPath {
        let gitri = root.join(Self::GitriDir.as_str());
        match self {
            Self::GitriDir => gitri,
            Self::DefaultManifest => gitri
                .join(Self::ManifestRepo.as_str())
                .join(self.as_str()),
            _ => gitri.join(self.as_str()),
        }
    }
}

impl AsRef<Path> for ProjectPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for ProjectPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_root() {
        let root = NormalizedPath::new("/work/proj");
        assert_eq!(
            ProjectPath::ActiveManifest.under(&root).as_str(),
            "/work/proj/.gitri/manifest.xml"
        );
        assert_eq!(
            ProjectPath::DefaultManifest.under(&root).as_str(),
            "/work/proj/.gitri/manifest/default.xml"
        );
        assert_eq!(
            ProjectPath::GitriDir.under(&root).as_str(),
            "/work/proj/.gitri"
        );
    }
}
