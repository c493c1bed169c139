//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::config::MANIFEST_FILE;
use crate::doc::DEFAULT_VERSION_ATTR;
use crate::fork::ForkArgs;
use crate::process::StreamMode;

/// docfork - Project documentation metadata and parallel self-launching
#[derive(Parser, Debug)]
#[command(name = "docfork")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// More log output (repeat for more)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the title and last section index of a README
    Readme {
        /// Markdown file to parse
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the validated version declared in a source file
    Version {
        /// File containing the version declaration
        file: PathBuf,

        /// Name of the version attribute
        #[arg(long, default_value = DEFAULT_VERSION_ATTR)]
        attr: String,
    },

    /// Print the documentation info of a project manifest
    Info {
        /// Path to the project manifest
        #[arg(default_value = MANIFEST_FILE)]
        manifest: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a text, optionally from several forked copies of this program
    Demo {
        /// Text to print
        #[arg(long, default_value = "Hello World!")]
        text: String,

        /// How many times to print the text
        #[arg(long, default_value = "1")]
        repeat: usize,

        /// Return right after starting the forks
        #[arg(long)]
        no_wait: bool,

        /// Output of forks without a log directory; captured lines are logged
        #[arg(long, value_enum, default_value_t = StreamMode::Inherit)]
        child_output: StreamMode,

        #[command(flatten)]
        fork: ForkArgs,
    },
}
