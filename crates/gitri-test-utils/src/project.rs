//! [`TestProject`] builder for gitri project scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest with remote `origin` at `https://example/repos` and one repository
/// `lib` tracking `main`.
pub const SINGLE_REPO_MANIFEST: &str = r#"<manifest>
  <remote name="origin" fetch="https://example/repos"/>
  <default remote="origin" revision="main"/>
  <project name="lib" path="lib"/>
</manifest>
"#;

/// A temporary project directory.
///
/// # Example
///
/// ```rust,no_run
/// use gitri_test_utils::project::{TestProject, SINGLE_REPO_MANIFEST};
///
/// let project = TestProject::new();
/// project.write_manifest(SINGLE_REPO_MANIFEST);
/// project.assert_file_exists(".gitri/manifest.xml");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` under the root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `.gitri/manifest.xml`, creating `.gitri` if needed.
    pub fn write_manifest(&self, xml: &str) {
        let dir = self.root().join(".gitri");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("manifest.xml"), xml).unwrap();
    }

    /// Write `.gitri/config.toml`.
    pub fn write_config(&self, toml: &str) {
        let dir = self.root().join(".gitri");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), toml).unwrap();
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}
