//! Title and section index extraction from `README.md` files.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use super::parse_int_in_range;
use crate::error::ReadmeError;

/// Highest byte position of the first `.` in a `## ` heading line that still
/// counts as unnumbered.
///
/// The marker `"## "` takes positions 0..3, so a dot at position 3 leaves no
/// room for an index. Indices are expected to have 1-3 digits.
pub const SECTION_INDEX_DOT_LIMIT: usize = 3;

const TITLE_MARKER: &str = "# ";
const SECTION_MARKER: &str = "## ";
const CODE_FENCE: &str = "```";

/// The title and last numbered top-level section of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    /// Text of the single `# ` heading.
    pub title: String,
    /// Index of the last `## N.` heading, if sections are numbered.
    pub last_section_index: Option<u32>,
}

/// Read and parse a `README.md` file.
pub fn parse_readme_file(path: impl AsRef<Path>) -> Result<DocumentMetadata, ReadmeError> {
    let path = path.as_ref();
    info!("Now parsing README.md file {}.", path.display());

    let text = std::fs::read_to_string(path).map_err(|source| ReadmeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let meta = parse_document(&text, &path.display().to_string())?;

    info!(
        "Finished parsing README.md file {}, got title {:?} and last section index {:?}.",
        path.display(),
        meta.title,
        meta.last_section_index
    );
    Ok(meta)
}

/// Scan a Markdown document for its title and last section index.
///
/// Content of fenced code blocks is skipped. `source_name` only appears in
/// error messages.
pub fn parse_document(text: &str, source_name: &str) -> Result<DocumentMetadata, ReadmeError> {
    let mut title: Option<String> = None;
    let mut last_index: Option<u32> = None;
    let mut seen_unnumbered = false;
    let mut in_code = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.starts_with(CODE_FENCE) {
            in_code = !in_code;
            continue;
        }
        if in_code {
            continue;
        }

        if let Some(rest) = line.strip_prefix(TITLE_MARKER) {
            let found = rest.trim();
            if let Some(existing) = title {
                return Err(ReadmeError::DuplicateTitle {
                    existing,
                    found: found.to_string(),
                    source_name: source_name.to_string(),
                });
            }
            debug!("Found title {found:?} in {source_name}.");
            title = Some(found.to_string());
        } else if line.starts_with(SECTION_MARKER) {
            match section_index(line) {
                Ok(index) => {
                    if seen_unnumbered {
                        return Err(ReadmeError::NumberedAfterUnnumbered {
                            line: line.to_string(),
                            index,
                            source_name: source_name.to_string(),
                        });
                    }
                    if let Some(last) = last_index {
                        if last >= index {
                            return Err(ReadmeError::NonIncreasingSectionIndex {
                                index,
                                last_index: last,
                                line: line.to_string(),
                                source_name: source_name.to_string(),
                            });
                        }
                    }
                    debug!("Found section {index} in {source_name}.");
                    last_index = Some(index);
                }
                Err(reason) => {
                    if let Some(last) = last_index {
                        return Err(ReadmeError::UnnumberedAfterNumbered {
                            line: line.to_string(),
                            last_index: last,
                            reason,
                            source_name: source_name.to_string(),
                        });
                    }
                    seen_unnumbered = true;
                }
            }
        }
    }

    let title = title.ok_or_else(|| ReadmeError::MissingTitle {
        source_name: source_name.to_string(),
    })?;
    Ok(DocumentMetadata {
        title,
        last_section_index: last_index,
    })
}

/// Extract the index of a `## N. ...` heading.
///
/// `Err(None)` means the heading has no room for an index at all,
/// `Err(Some(reason))` that the text before the dot is not a valid index.
fn section_index(line: &str) -> Result<u32, Option<String>> {
    match line.find('.') {
        Some(dot) if dot > SECTION_INDEX_DOT_LIMIT => {
            let text = line[SECTION_MARKER.len()..dot].trim();
            let value = parse_int_in_range(text, "s", 1, 1000).map_err(Some)?;
            u32::try_from(value).map_err(|e| Some(e.to_string()))
        }
        _ => Err(None),
    }
}
