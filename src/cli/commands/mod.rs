//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use std::time::Duration;

use crate::cli::{CommandContext, Commands};
use crate::config::Config;
use crate::error::Result;
use crate::settings::{FileBlobStore, SettingsStore};

pub mod config;
pub mod probe;
pub mod search;
pub mod share;
pub mod tui;

pub fn run(ctx: &CommandContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Tui(args) => tui::run(ctx, args),
        Commands::Search(args) => search::run(ctx, args),
        Commands::Probe(args) => probe::run(ctx, args),
        Commands::Config(args) => config::run(ctx, args),
        Commands::Share(args) => share::run(ctx, args),
    }
}

/// Settings store backed by the configured storage directory.
pub(crate) fn open_store(config: &Config) -> Result<SettingsStore> {
    let dir = config.storage_dir()?;
    Ok(SettingsStore::open(Box::new(FileBlobStore::new(dir))))
}

/// How long a headless command waits for the engine to settle. Metadata
/// resolution makes two sequential calls, each bounded by the HTTP timeout.
pub(crate) fn settle_timeout(config: &Config) -> Duration {
    Duration::from_secs(config.http.timeout_secs.max(1) * 2 + 1)
}
