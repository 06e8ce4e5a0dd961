//! searchpane - live search demo client
//!
//! Point it at a Meilisearch-compatible engine, pick an index and browse
//! results as you type.

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use searchpane::Result;
use searchpane::cli::{Cli, CommandContext};
use searchpane::config::Config;
use searchpane::error::StructuredError;

const LOG_FILE: &str = "searchpane.log";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.robot {
                // Robot mode: JSON error output to stdout
                let error_json = StructuredError::from_sp_error(&e);
                println!("{}", serde_json::to_string(&error_json).unwrap_or_default());
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = CommandContext::from_cli(cli)?;
    searchpane::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,searchpane=info",
        1 => "info,searchpane=debug",
        2 => "debug,searchpane=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.command.is_interactive() {
        // The TUI owns the terminal; log to a file or not at all.
        let Some(file) = open_log_file(cli) else {
            return;
        };
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    } else if cli.robot {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn open_log_file(cli: &Cli) -> Option<std::fs::File> {
    let dir = Config::load(cli.config.as_deref())
        .and_then(|config| config.storage_dir())
        .ok()?;
    std::fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
        .ok()
}
