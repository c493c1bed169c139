//! Error types for the documentation parsers and the forker.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while scanning a README-style document for its title and sections.
#[derive(Debug, Error)]
pub enum ReadmeError {
    #[error("Already have title {existing:?} but now found {found:?} in {source_name}.")]
    DuplicateTitle {
        existing: String,
        found: String,
        source_name: String,
    },

    #[error("No title in {source_name}.")]
    MissingTitle { source_name: String },

    #[error("Got numbered heading {line:?} (index {index}) after an unnumbered one in {source_name}.")]
    NumberedAfterUnnumbered {
        line: String,
        index: u32,
        source_name: String,
    },

    #[error("Got {line:?} after having index {last_index} in {source_name}: unnumbered heading found after a numbered one{}.",
        .reason.as_ref().map(|r| format!(" ({r})")).unwrap_or_default())]
    UnnumberedAfterNumbered {
        line: String,
        last_index: u32,
        reason: Option<String>,
        source_name: String,
    },

    #[error("Found index {index} in line {line:?} after index {last_index} in {source_name}.")]
    NonIncreasingSectionIndex {
        index: u32,
        last_index: u32,
        line: String,
        source_name: String,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while locating or validating a version string.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("Invalid version attr {0:?}.")]
    EmptyAttribute(String),

    #[error("Strange version string {line:?} in {source_name}.")]
    MalformedDeclaration { line: String, source_name: String },

    #[error("Incorrect string limits for {line:?} in version file {source_name}.")]
    UnterminatedQuote { line: String, source_name: String },

    #[error("Undelimited string in {line:?} in version file {source_name}.")]
    MissingQuote { line: String, source_name: String },

    #[error("Version defined as {existing:?} in {source_name} but encountered {line:?}.")]
    DuplicateDeclaration {
        existing: String,
        line: String,
        source_name: String,
    },

    #[error("Did not find version attr {attribute:?} in {source_name}.")]
    AttributeNotFound {
        attribute: String,
        source_name: String,
    },

    #[error("Invalid version {0:?}: empty or only white space.")]
    EmptyVersion(String),

    #[error("Invalid version {version:?}: {reason}.")]
    InvalidVersionComponent {
        version: String,
        component: String,
        reason: String,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while forking the current program.
#[derive(Debug, Error)]
pub enum ForkError {
    #[error("Invalid value {0} for number of processes to fork.")]
    InvalidForkCount(f64),

    #[error("Failed to determine the current executable: {0}")]
    CurrentExe(#[source] std::io::Error),

    #[error("Failed to create log directory {}: {source}", .path.display())]
    LogDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create log file {}: {source}", .path.display())]
    LogFileCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn fork {index} ({program}): {source}")]
    Spawn {
        index: usize,
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while assembling [`crate::doc::DocInfo`].
#[derive(Debug, Error)]
pub enum InfoError {
    #[error("Invalid {field} {value:?}.")]
    EmptyField { field: &'static str, value: String },

    #[error("last_section_index={0} is invalid, must be in 1..1000000.")]
    InvalidSectionIndex(u32),

    #[error("Invalid manifest {}: {reason}", .path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Readme(#[from] ReadmeError),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
