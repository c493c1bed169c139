//! Documentation information assembled from a project manifest.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::{parse_readme_file, parse_version_file, validate_version};
use crate::config::{ProjectManifest, VersionSource};
use crate::error::InfoError;

const SECTION_INDEX_MAX: u32 = 1_000_000;

/// Everything needed to render documentation in a uniform way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocInfo {
    /// The `README.md` the title came from.
    pub readme_file: PathBuf,
    pub project: String,
    pub author: String,
    pub title: String,
    pub version: String,
    /// Index of the last numbered top-level section of the README.
    pub last_section_index: Option<u32>,
    /// Base URL of the documentation.
    pub doc_url: String,
}

impl DocInfo {
    /// Build and validate a record.
    ///
    /// String fields are trimmed and must not be empty, the version must be
    /// valid and the section index, if any, must lie in `1..1_000_000`.
    pub fn new(
        readme_file: impl Into<PathBuf>,
        project: &str,
        author: &str,
        title: &str,
        version: &str,
        last_section_index: Option<u32>,
        doc_url: &str,
    ) -> Result<Self, InfoError> {
        let project = non_empty("project name", project)?;
        let author = non_empty("author name", author)?;
        let title = non_empty("title", title)?;
        validate_version(version)?;
        if let Some(index) = last_section_index {
            if !(1..SECTION_INDEX_MAX).contains(&index) {
                return Err(InfoError::InvalidSectionIndex(index));
            }
        }
        let doc_url = non_empty("documentation url", doc_url)?;

        Ok(Self {
            readme_file: readme_file.into(),
            project,
            author,
            title,
            version: version.trim().to_string(),
            last_section_index,
            doc_url,
        })
    }

    /// Load the manifest at `path`, then read the README and version it points to.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InfoError> {
        let path = path.as_ref();
        info!("Now loading documentation info from {}.", path.display());

        let manifest = ProjectManifest::load(path)?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        let meta = &manifest.metadata;

        let version = match meta.version_source(root, path)? {
            VersionSource::Literal(version) => version,
            VersionSource::File { path, attribute } => parse_version_file(path, &attribute)?,
        };
        let readme_file = root.join(&meta.readme);
        let readme = parse_readme_file(&readme_file)?;
        let doc_url = meta.doc_url(path)?;

        let info = Self::new(
            readme_file,
            &meta.name,
            &meta.author,
            &readme.title,
            &version,
            readme.last_section_index,
            &doc_url,
        )?;
        info!("Finished loading documentation info from {}, found {info}", path.display());
        Ok(info)
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<String, InfoError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InfoError::EmptyField {
            field,
            value: value.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

impl fmt::Display for DocInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} project {:?} by {:?}, version {:?}, with readme file {} having the last section ",
            self.title,
            self.project,
            self.author,
            self.version,
            self.readme_file.display()
        )?;
        match self.last_section_index {
            Some(index) => write!(f, "{index}")?,
            None => write!(f, "None")?,
        }
        write!(f, " and documentation url {}.", self.doc_url)
    }
}
