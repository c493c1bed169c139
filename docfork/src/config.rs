//! Project manifest (`docfork.toml`) describing where documentation metadata lives.
//!
//! ```toml
//! [metadata]
//! name = "pycommons"
//! author = "Jane Doe"
//! readme = "README.md"
//! version_file = "pycommons/version.py"
//! documentation = "https://example.com/pycommons"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::doc::DEFAULT_VERSION_ATTR;
use crate::error::InfoError;

/// Default manifest file name looked up by the CLI.
pub const MANIFEST_FILE: &str = "docfork.toml";

/// Top-level manifest document.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectManifest {
    pub metadata: Metadata,
}

/// The `[metadata]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// Project name.
    pub name: String,
    /// Author name.
    pub author: String,
    /// Path of the `README.md`, relative to the manifest.
    #[serde(default = "default_readme")]
    pub readme: PathBuf,
    /// Literal version string.
    pub version: Option<String>,
    /// File declaring the version, relative to the manifest.
    pub version_file: Option<PathBuf>,
    /// Attribute holding the version inside `version_file`.
    #[serde(default = "default_version_attr")]
    pub version_attr: String,
    /// Project home page, used when `documentation` is absent.
    pub url: Option<String>,
    /// Base URL of the rendered documentation.
    pub documentation: Option<String>,
}

fn default_readme() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_version_attr() -> String {
    DEFAULT_VERSION_ATTR.to_string()
}

/// Where the version string comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    Literal(String),
    File { path: PathBuf, attribute: String },
}

impl ProjectManifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, InfoError> {
        let contents = std::fs::read_to_string(path).map_err(|source| InfoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents, path)
    }

    /// Parse manifest text; `path` is only used in error messages.
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, InfoError> {
        toml::from_str(contents).map_err(|e| InfoError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl Metadata {
    /// Resolve the version source, relative to the manifest directory `root`.
    pub fn version_source(&self, root: &Path, manifest: &Path) -> Result<VersionSource, InfoError> {
        match (&self.version, &self.version_file) {
            (Some(version), None) => Ok(VersionSource::Literal(version.clone())),
            (None, Some(file)) => Ok(VersionSource::File {
                path: root.join(file),
                attribute: self.version_attr.clone(),
            }),
            (Some(_), Some(_)) => Err(InfoError::Manifest {
                path: manifest.to_path_buf(),
                reason: "version and version_file are mutually exclusive".to_string(),
            }),
            (None, None) => Err(InfoError::Manifest {
                path: manifest.to_path_buf(),
                reason: "one of version or version_file is required".to_string(),
            }),
        }
    }

    /// The documentation URL, falling back to the project URL.
    pub fn doc_url(&self, manifest: &Path) -> Result<String, InfoError> {
        self.documentation
            .clone()
            .or_else(|| self.url.clone())
            .ok_or_else(|| InfoError::Manifest {
                path: manifest.to_path_buf(),
                reason: "neither documentation nor url is set".to_string(),
            })
    }
}
