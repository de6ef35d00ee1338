//! CLI command definitions and dispatch.

mod search;
mod version;

use clap::{Parser, Subcommand};

pub use search::SearchArgs;

/// Quarry — search container image registries.
#[derive(Parser)]
#[command(name = "quarry", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// Search registries for an image
    Search(search::SearchArgs),
    /// Show version information
    Version(version::VersionArgs),
}

/// Dispatch a parsed CLI to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Search(args) => search::execute(args).await,
        Command::Version(args) => version::execute(args).await,
    }
}
