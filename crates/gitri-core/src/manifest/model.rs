//! Typed manifest values

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Error, Result};

/// Free-form attribute bag, ordered by name.
pub type Attributes = BTreeMap<String, String>;

/// A named place repositories are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    /// Base fetch URL; repository URLs are `<fetch>/<repo name>`
    pub fetch: String,
    /// Attributes other than `name` and `fetch`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: Attributes,
}

impl Remote {
    pub(crate) fn from_attributes(mut attributes: Attributes) -> Result<Self> {
        let name = take_required(&mut attributes, "remote", "name")?;
        let fetch = take_required(&mut attributes, "remote", "fetch")?;
        Ok(Self {
            name,
            fetch,
            extra: attributes,
        })
    }

    /// URL of the repository `repo` on this remote.
    pub fn repo_url(&self, repo: &str) -> String {
        format!("{}/{}", self.fetch, repo)
    }
}

/// Attribute base applied to every repository entry that follows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestDefault {
    pub attributes: Attributes,
}

impl ManifestDefault {
    /// Layer another `default` element over this one.
    pub fn merge(&mut self, attributes: &Attributes) {
        self.attributes
            .extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn remote(&self) -> Option<&str> {
        self.attributes.get("remote").map(String::as_str)
    }

    pub fn revision(&self) -> Option<&str> {
        self.attributes.get("revision").map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// One repository to keep in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSpec {
    pub name: String,
    /// Location relative to the project root, normalized with `/`
    pub path: String,
    /// Name of the remote to fetch from
    pub remote: String,
    /// Branch, tag, or commit to track; `None` tracks the remote's default branch
    pub revision: Option<String>,
    /// Attributes with no dedicated field, defaults included
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: Attributes,
}

impl RepoSpec {
    /// Merge `defaults` under `attributes` and extract the typed fields.
    pub fn from_attributes(defaults: &ManifestDefault, attributes: &Attributes) -> Result<Self> {
        let mut merged = defaults.attributes.clone();
        merged.extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));

        let name = take_required(&mut merged, "project", "name")?;
        let remote = take_required(&mut merged, "project", "remote")?;
        let revision = merged.remove("revision");
        let raw_path = merged.remove("path").unwrap_or_else(|| name.clone());

        let path = gitri_fs::confine_relative(&raw_path).map_err(|_| Error::InvalidRepoPath {
            repo: name.clone(),
            path: raw_path.clone(),
        })?;

        Ok(Self {
            name,
            path,
            remote,
            revision,
            extra: merged,
        })
    }

    /// Get an attribute by name, typed fields included.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "path" => Some(&self.path),
            "remote" => Some(&self.remote),
            "revision" => self.revision.as_deref(),
            _ => self.extra.get(key).map(String::as_str),
        }
    }
}

/// Everything a manifest declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub remotes: BTreeMap<String, Remote>,
    /// Repository entries in document order
    pub repos: Vec<RepoSpec>,
    /// Accumulated defaults as of the end of the document
    pub default: ManifestDefault,
}

impl Manifest {
    pub fn remote(&self, name: &str) -> Option<&Remote> {
        self.remotes.get(name)
    }

    pub fn repo(&self, name: &str) -> Option<&RepoSpec> {
        self.repos.iter().find(|r| r.name == name)
    }
}

fn take_required(attributes: &mut Attributes, element: &str, attribute: &str) -> Result<String> {
    attributes
        .remove(attribute)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        })
}
