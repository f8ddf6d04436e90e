//! Reading `.gitri/config.toml` and friends into typed settings

use serde::de::DeserializeOwned;

use crate::{Error, NormalizedPath, Result, io};

/// Deserializes settings files, picking the parser by extension.
///
/// `.toml` and `.json` are understood; the extension match ignores case.
#[derive(Debug, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let extension = path.extension().unwrap_or_default().to_ascii_lowercase();
        let text = io::read_text(path)?;
        let parse_error = |format: &str, message: String| Error::ConfigParse {
            path: path.to_native(),
            format: format.to_owned(),
            message,
        };

        match extension.as_str() {
            "toml" => toml::from_str(&text).map_err(|e| parse_error("TOML", e.to_string())),
            "json" => serde_json::from_str(&text).map_err(|e| parse_error("JSON", e.to_string())),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    /// Like [`ConfigStore::load`], but an absent file means `T::default()`.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, path: &NormalizedPath) -> Result<T> {
        if !path.is_file() {
            tracing::debug!(path = %path, "no settings file, using defaults");
            return Ok(T::default());
        }
        self.load(path)
    }
}
