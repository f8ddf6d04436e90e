//! ProjectInitializer: bootstrap a project from a manifest repository

use std::path::Path;

use gitri_fs::{NormalizedPath, ProjectPath, io};
use gitri_git::CloneRequest;

use super::Project;
use crate::sync::{ORIGIN, SyncEngine, SyncReport};
use crate::{Error, Result};

impl Project {
    /// Create a project from the manifest repository at `url` and sync it.
    ///
    /// `dir` defaults to [`default_project_dir`] of the URL, relative to the
    /// current directory. `revset` selects the manifest revision to check out
    /// (branch, tag, or commit); `None` uses the remote's default branch.
    ///
    /// The manifest repository is cloned to `.gitri/manifest` and its
    /// `default.xml` becomes the active manifest. When `default.xml` is
    /// missing the partially created directory is left in place.
    pub fn init(
        engine: &SyncEngine,
        url: &str,
        dir: Option<&Path>,
        revset: Option<&str>,
    ) -> Result<(Self, SyncReport)> {
        let root = match dir {
            Some(dir) => NormalizedPath::absolute(dir)?,
            None => NormalizedPath::absolute(default_project_dir(url)?)?,
        };

        if root.exists() {
            return Err(Error::ProjectAlreadyExists {
                path: root.to_native(),
            });
        }

        let gitri_dir = ProjectPath::GitriDir.under(&root);
        std::fs::create_dir_all(gitri_dir.to_native())
            .map_err(|e| gitri_fs::Error::io(gitri_dir.to_native(), e))?;

        let manifest_repo = ProjectPath::ManifestRepo.under(&root);
        tracing::info!(url, dest = %manifest_repo, revset, "cloning manifest repository");
        engine.backend().clone_repo(&CloneRequest {
            url,
            dest: &manifest_repo,
            remote: Some(ORIGIN),
            revision: revset,
            local_branch: None,
        })?;

        let source = ProjectPath::DefaultManifest.under(&root);
        if !source.is_file() {
            return Err(Error::InvalidManifestRepo {
                path: manifest_repo.to_native(),
            });
        }
        io::copy_atomic(&source, &ProjectPath::ActiveManifest.under(&root))?;

        let project = Project::load(root.to_native())?;
        let report = engine.sync(&project)?;
        Ok((project, report))
    }
}

/// Directory name derived from a manifest URL.
///
/// The last path segment with its extension removed:
/// `https://host/manifests.git` gives `manifests`.
pub fn default_project_dir(url: &str) -> Result<String> {
    let trimmed = url.trim_end_matches(['/', '\\']);
    let base = trimmed
        .rsplit(['/', '\\', ':'])
        .next()
        .unwrap_or(trimmed);

    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };

    if stem.is_empty() || stem == "." || stem == ".." {
        return Err(Error::InvalidUrl {
            url: url.to_string(),
        });
    }
    Ok(stem.to_string())
}
