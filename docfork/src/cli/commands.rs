//! CLI command execution.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::doc::{parse_readme_file, parse_version_file, DocInfo};
use crate::fork::{fork, ForkArgs, ForkOptions};
use crate::process::StreamMode;

use super::args::{Cli, Commands};

/// Execute the parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Readme { file, json } => show_readme(&file, json),
        Commands::Version { file, attr } => show_version(&file, &attr),
        Commands::Info { manifest, json } => show_info(&manifest, json),
        Commands::Demo {
            text,
            repeat,
            no_wait,
            child_output,
            fork,
        } => run_demo(&text, repeat, no_wait, child_output, &fork).await,
    }
}

fn show_readme(file: &Path, json: bool) -> Result<()> {
    let meta = parse_readme_file(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
        return Ok(());
    }
    println!("Title: {}", meta.title);
    match meta.last_section_index {
        Some(index) => println!("Last section: {index}"),
        None => println!("Last section: none"),
    }
    Ok(())
}

fn show_version(file: &Path, attr: &str) -> Result<()> {
    let version = parse_version_file(file, attr)?;
    println!("{version}");
    Ok(())
}

fn show_info(manifest: &Path, json: bool) -> Result<()> {
    let info = DocInfo::load(manifest)
        .with_context(|| format!("Failed to load documentation info from {}", manifest.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{info}");
    }
    Ok(())
}

async fn run_demo(
    text: &str,
    repeat: usize,
    no_wait: bool,
    child_output: StreamMode,
    args: &ForkArgs,
) -> Result<()> {
    let argv: Vec<String> = std::env::args().collect();
    let mut options = ForkOptions::new().output(child_output);
    if no_wait {
        options = options.no_wait();
    }

    let Some(identity) = fork(args, &argv, &options).await? else {
        info!("All forks launched");
        return Ok(());
    };

    for _ in 0..repeat {
        println!("{}", demo_line(identity.fork_id, text));
    }
    Ok(())
}

fn demo_line(fork_id: Option<usize>, text: &str) -> String {
    match fork_id {
        Some(id) => format!("Fork {id} with text={text}"),
        None => format!("Original process with text={text}"),
    }
}
