//! Project metadata extraction for documentation builds.
//!
//! The title and section numbering come from the `README.md`, the version from
//! a small source file declaring it (`__version__ = "1.2.3"`). [`DocInfo`]
//! ties both together with the data from a project manifest.

mod info;
mod readme;
mod version;

pub use info::DocInfo;
pub use readme::{parse_document, parse_readme_file, DocumentMetadata, SECTION_INDEX_DOT_LIMIT};
pub use version::{
    parse_version_declaration, parse_version_file, validate_version, DEFAULT_VERSION_ATTR,
};

/// Parse `text` as an integer and check that it lies in `min..max`.
///
/// The error string names the value as `name` and is meant to be embedded
/// into a larger error message.
pub(crate) fn parse_int_in_range(text: &str, name: &str, min: i64, max: i64) -> Result<i64, String> {
    let value: i64 = text
        .parse()
        .map_err(|_| format!("Cannot convert {name}={text:?} to int, let alone in range {min}..{max}"))?;
    if value < min || value >= max {
        return Err(format!("{name}={value} is invalid, must be in {min}..{max}"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_in_range_accepts_bounds() {
        assert_eq!(parse_int_in_range("1", "s", 1, 1000), Ok(1));
        assert_eq!(parse_int_in_range("999", "s", 1, 1000), Ok(999));
    }

    #[test]
    fn int_in_range_rejects_upper_bound() {
        let err = parse_int_in_range("1000", "s", 1, 1000).unwrap_err();
        assert_eq!(err, "s=1000 is invalid, must be in 1..1000");
    }

    #[test]
    fn int_in_range_rejects_garbage() {
        let err = parse_int_in_range("x", "version", 0, 10).unwrap_err();
        assert!(err.starts_with("Cannot convert version=\"x\" to int"));
    }
}
