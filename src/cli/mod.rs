//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;

pub mod commands;
pub mod output;

/// searchpane - live search demo client for Meilisearch-compatible engines
#[derive(Parser, Debug)]
#[command(name = "searchpane")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable JSON output for machine consumption
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/searchpane/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive search UI (TUI)
    Tui(commands::tui::TuiArgs),

    /// Run one search and print the results
    Search(commands::search::SearchArgs),

    /// Check host, key and index metadata
    Probe(commands::probe::ProbeArgs),

    /// Show or edit the saved search settings
    Config(commands::config::ConfigArgs),

    /// Create or apply share links
    Share(commands::share::ShareArgs),
}

impl Commands {
    /// True for commands that take over the terminal.
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        matches!(self, Self::Tui(_))
    }
}

/// Shared state handed to every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    pub robot_mode: bool,
}

impl CommandContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        Ok(Self {
            config,
            robot_mode: cli.robot,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["searchpane", "search", "dune", "--robot", "-vv"]).unwrap();
        assert!(cli.robot);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Search(_)));
        assert!(!cli.command.is_interactive());
    }

    #[test]
    fn tui_is_interactive() {
        let cli = Cli::try_parse_from(["searchpane", "tui"]).unwrap();
        assert!(cli.command.is_interactive());
    }
}
