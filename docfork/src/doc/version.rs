//! Version string lookup and validation.

use std::path::Path;

use tracing::{debug, info};

use super::parse_int_in_range;
use crate::error::VersionError;

/// Attribute looked up when none is configured.
pub const DEFAULT_VERSION_ATTR: &str = "__version__";

const VERSION_COMPONENT_MAX: i64 = 1_000_000_000;
const QUOTES: [char; 2] = ['\'', '"'];

/// Read a version file, find the declaration of `attribute` and validate it.
pub fn parse_version_file(path: impl AsRef<Path>, attribute: &str) -> Result<String, VersionError> {
    let path = path.as_ref();
    info!(
        "Now parsing version file {}, looking for attribute {:?}.",
        path.display(),
        attribute.trim()
    );

    let text = std::fs::read_to_string(path).map_err(|source| VersionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let version = parse_version_declaration(&text, attribute, &path.display().to_string())?;
    validate_version(&version)?;

    info!("Found version string {version:?} in file {}.", path.display());
    Ok(version)
}

/// Find the quoted value assigned to `attribute` in `text`.
///
/// Both `attr = "1.2"` and `attr: '1.2'` declarations are recognized. The
/// attribute must be declared exactly once.
pub fn parse_version_declaration(
    text: &str,
    attribute: &str,
    source_name: &str,
) -> Result<String, VersionError> {
    let attribute = attribute.trim();
    if attribute.is_empty() {
        return Err(VersionError::EmptyAttribute(attribute.to_string()));
    }

    let mut version: Option<String> = None;
    for raw in text.lines() {
        let line = raw.trim();
        let tokens: Vec<&str> = line
            .split('=')
            .flat_map(|part| part.split(':'))
            .map(str::trim)
            .collect();
        if !names_attribute(tokens[0], attribute) {
            continue;
        }

        if let Some(existing) = version {
            return Err(VersionError::DuplicateDeclaration {
                existing,
                line: raw.to_string(),
                source_name: source_name.to_string(),
            });
        }
        let Some(&value) = tokens.last().filter(|_| tokens.len() > 1) else {
            return Err(VersionError::MalformedDeclaration {
                line: raw.to_string(),
                source_name: source_name.to_string(),
            });
        };

        let Some(quote) = value.chars().next().filter(|c| QUOTES.contains(c)) else {
            return Err(VersionError::MissingQuote {
                line: raw.to_string(),
                source_name: source_name.to_string(),
            });
        };
        if value.len() < 2 || !value.ends_with(quote) {
            return Err(VersionError::UnterminatedQuote {
                line: raw.to_string(),
                source_name: source_name.to_string(),
            });
        }

        let found = value[1..value.len() - 1].trim().to_string();
        debug!("Found declaration {found:?} of {attribute:?} in {source_name}.");
        version = Some(found);
    }

    version.ok_or_else(|| VersionError::AttributeNotFound {
        attribute: attribute.to_string(),
        source_name: source_name.to_string(),
    })
}

/// Whether a declaration's left-hand side names `attribute`, allowing the
/// key of a dict-style declaration wrapped in one kind of quote.
fn names_attribute(token: &str, attribute: &str) -> bool {
    token == attribute
        || QUOTES.iter().any(|&quote| {
            token
                .strip_prefix(quote)
                .and_then(|key| key.strip_suffix(quote))
                == Some(attribute)
        })
}

/// Check that `version` is a dot separated list of integers in
/// `0..1_000_000_000`.
pub fn validate_version(version: &str) -> Result<(), VersionError> {
    let trimmed = version.trim();
    if trimmed.is_empty() {
        return Err(VersionError::EmptyVersion(version.to_string()));
    }
    for component in trimmed.split('.') {
        parse_int_in_range(component.trim(), "version", 0, VERSION_COMPONENT_MAX).map_err(|reason| {
            VersionError::InvalidVersionComponent {
                version: version.to_string(),
                component: component.to_string(),
                reason,
            }
        })?;
    }
    Ok(())
}
