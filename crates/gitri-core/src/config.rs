//! Project configuration from `.gitri/config.toml`
//!
//! Every field is optional; a project without the file gets the defaults.
//!
//! ```toml
//! [sync]
//! keep_going = true
//! ```

use gitri_fs::{ConfigStore, NormalizedPath, ProjectPath};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Settings for the `sync` command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    /// Record per-repository failures and continue with the next repository
    pub keep_going: bool,
}

/// Project configuration parsed from `.gitri/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub sync: SyncSection,
}

impl ProjectConfig {
    /// Load the configuration for the project at `root`.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        let path = ProjectPath::Config.under(root);
        Ok(ConfigStore::new().load_or_default(&path)?)
    }
}
