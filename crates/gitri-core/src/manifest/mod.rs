//! Manifest data model and loader
//!
//! A manifest is an XML document rooted at `<manifest>`:
//!
//! ```xml
//! <manifest>
//!   <remote name="origin" fetch="https://example.com/repos"/>
//!   <default remote="origin" revision="main"/>
//!   <project name="lib" path="libs/lib"/>
//!   <repo name="app"/>
//! </manifest>
//! ```
//!
//! `project` and `repo` are synonyms. A `default` seeds the repository
//! entries that follow it; explicit attributes always win.

mod loader;
mod model;

pub use model::{Attributes, Manifest, ManifestDefault, Remote, RepoSpec};
