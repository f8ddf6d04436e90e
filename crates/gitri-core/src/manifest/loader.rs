//! ManifestLoader: XML document to [`Manifest`]

use std::collections::HashSet;

use gitri_fs::{NormalizedPath, io};
use roxmltree::{Document, Node};

use super::model::{Attributes, Manifest, Remote, RepoSpec};
use crate::{Error, Result};

const ROOT_ELEMENT: &str = "manifest";

impl Manifest {
    /// Read and parse the manifest at `path`.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let text = io::read_text(path)?;
        Self::parse_with_location(&text, path.as_str())
    }

    /// Parse a manifest document held in memory.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_location(text, "<input>")
    }

    fn parse_with_location(text: &str, location: &str) -> Result<Self> {
        let malformed = |message: String| Error::MalformedManifest {
            location: location.to_string(),
            message,
        };

        let doc = Document::parse(text).map_err(|e| malformed(e.to_string()))?;
        let root = doc.root_element();
        if root.tag_name().name() != ROOT_ELEMENT {
            return Err(malformed(format!(
                "no <{ROOT_ELEMENT}> element (found <{}>)",
                root.tag_name().name()
            )));
        }

        let mut manifest = Manifest::default();
        let mut paths = HashSet::new();

        for node in root.children().filter(|n| n.is_element()) {
            let attributes = attributes_of(&node);
            match node.tag_name().name() {
                "default" => manifest.default.merge(&attributes),
                "remote" => {
                    let remote = Remote::from_attributes(attributes)?;
                    if manifest.remotes.contains_key(&remote.name) {
                        return Err(Error::DuplicateRemote { name: remote.name });
                    }
                    manifest.remotes.insert(remote.name.clone(), remote);
                }
                "project" | "repo" => {
                    let spec = RepoSpec::from_attributes(&manifest.default, &attributes)?;
                    if manifest.repo(&spec.name).is_some() {
                        return Err(Error::DuplicateRepo { name: spec.name });
                    }
                    if !paths.insert(spec.path.clone()) {
                        return Err(Error::DuplicatePath { path: spec.path });
                    }
                    manifest.repos.push(spec);
                }
                other => {
                    tracing::debug!(element = other, location, "ignoring unknown manifest element");
                }
            }
        }

        // Remotes may be declared after the repositories that use them.
        for spec in &manifest.repos {
            if !manifest.remotes.contains_key(&spec.remote) {
                return Err(Error::UnknownRemote {
                    repo: spec.name.clone(),
                    remote: spec.remote.clone(),
                });
            }
        }

        tracing::debug!(
            location,
            remotes = manifest.remotes.len(),
            repos = manifest.repos.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }
}

fn attributes_of(node: &Node<'_, '_>) -> Attributes {
    node.attributes()
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect()
}
