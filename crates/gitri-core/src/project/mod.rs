//! Project loading and discovery
//!
//! A directory is a gitri project when `.gitri/manifest.xml` exists directly
//! under it.

mod init;

use std::collections::BTreeMap;
use std::path::Path;

use gitri_fs::{NormalizedPath, ProjectPath};

use crate::config::ProjectConfig;
use crate::manifest::{Manifest, Remote, RepoSpec};
use crate::{Error, Result};

pub use init::default_project_dir;

/// A loaded gitri project.
///
/// Loaded once per command and not modified while a sync runs.
#[derive(Debug, Clone)]
pub struct Project {
    root: NormalizedPath,
    manifest: Manifest,
    config: ProjectConfig,
}

impl Project {
    /// Load the project rooted at `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let root = NormalizedPath::absolute(dir.as_ref())?;
        if !Self::is_valid_project(&root) {
            return Err(Error::InvalidProject {
                path: root.to_native(),
            });
        }

        let manifest = Manifest::load(&ProjectPath::ActiveManifest.under(&root))?;
        let config = ProjectConfig::load(&root)?;

        tracing::debug!(root = %root, repos = manifest.repos.len(), "loaded project");
        Ok(Self {
            root,
            manifest,
            config,
        })
    }

    /// Whether `dir` holds an active manifest.
    pub fn is_valid_project(dir: &NormalizedPath) -> bool {
        ProjectPath::ActiveManifest.under(dir).exists()
    }

    /// Load the nearest project at or above `start`.
    ///
    /// `start` defaults to the current directory. Every ancestor up to the
    /// filesystem root is tried.
    pub fn find(start: Option<&Path>) -> Result<Self> {
        let start = match start {
            Some(dir) => NormalizedPath::absolute(dir)?,
            None => NormalizedPath::new(std::env::current_dir()?),
        };

        let mut candidate = Some(start.clone());
        while let Some(dir) = candidate {
            if Self::is_valid_project(&dir) {
                return Self::load(dir.to_native());
            }
            candidate = dir.parent();
        }

        Err(Error::InvalidProject {
            path: start.to_native(),
        })
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn remotes(&self) -> &BTreeMap<String, Remote> {
        &self.manifest.remotes
    }

    pub fn repos(&self) -> &[RepoSpec] {
        &self.manifest.repos
    }

    /// Working directory of `spec` inside this project.
    pub fn repo_path(&self, spec: &RepoSpec) -> NormalizedPath {
        self.root.join(&spec.path)
    }

    /// Checkout of the manifest repository, `.gitri/manifest`.
    pub fn manifest_repo_path(&self) -> NormalizedPath {
        ProjectPath::ManifestRepo.under(&self.root)
    }

    pub fn lock_path(&self) -> NormalizedPath {
        ProjectPath::SyncLock.under(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"<manifest>
  <remote name="origin" fetch="https://example/repos"/>
  <repo name="lib" path="libs/lib" remote="origin"/>
</manifest>"#;

    fn write_project(dir: &Path) {
        let gitri = dir.join(".gitri");
        std::fs::create_dir_all(&gitri).unwrap();
        std::fs::write(gitri.join("manifest.xml"), MANIFEST).unwrap();
    }

    #[test]
    fn test_load_requires_marker() {
        let temp = TempDir::new().unwrap();
        let err = Project::load(temp.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidProject { .. }));
    }

    #[test]
    fn test_repo_path_is_under_root() {
        let temp = TempDir::new().unwrap();
        write_project(temp.path());

        let project = Project::load(temp.path()).unwrap();
        let spec = &project.repos()[0];
        let path = project.repo_path(spec);
        assert!(path.as_str().ends_with("/libs/lib"), "got {}", path);
        assert!(path.as_str().starts_with(project.root().as_str()));
    }

    #[test]
    fn test_layout_paths() {
        let temp = TempDir::new().unwrap();
        write_project(temp.path());

        let project = Project::load(temp.path()).unwrap();
        assert!(project.manifest_repo_path().as_str().ends_with(".gitri/manifest"));
        assert!(project.lock_path().as_str().ends_with(".gitri/sync.lock"));
    }
}
