//! Documentation metadata extraction and parallel self-launching.
//!
//! - [`doc`] reads a project's title, section numbering and version from its
//!   README and version file.
//! - [`fork`] re-launches the running program as several copies, each with
//!   its own identity and optionally its own log files.
//! - [`process`] holds the generic child process plumbing both build on.

pub mod cli;
pub mod config;
pub mod doc;
pub mod error;
pub mod fork;
pub mod logging;
pub mod process;
pub mod sink;

pub use error::{ForkError, InfoError, ReadmeError, VersionError};
