//! sporeformats CLI - Command-line interface for Spore asset conversion

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;
use std::path::{Path, PathBuf};

use crate::formats::common::HashRegistry;

#[derive(Parser)]
#[command(name = "sporeformats")]
#[command(about = "sporeformats: Spore asset format tools", long_about = None)]
struct Cli {
    /// Name registry file ("name" or "name 0xHASH" per line) for rendering
    /// hashes as readable names
    #[arg(long, global = true)]
    names: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Run the sporeformats CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut registry = HashRegistry::new();
    if let Some(names) = &cli.names {
        registry.load(expand_path(names))?;
    }

    cli.command.execute(&registry)?;

    Ok(())
}

/// Expand a leading `~` in a path argument.
#[must_use]
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
