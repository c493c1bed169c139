//! docfork - project documentation metadata and forking demo.

use anyhow::Result;
use clap::Parser;

use docfork::cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    docfork::logging::init(cli.verbose, cli.quiet);
    execute(cli).await
}
