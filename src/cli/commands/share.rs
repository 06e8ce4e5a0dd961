//! searchpane share - Create or apply share links

use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;
use tracing::warn;

use crate::cli::CommandContext;
use crate::cli::commands::open_store;
use crate::cli::output::emit_json;
use crate::error::Result;
use crate::settings::{SettingsStore, consume_share_link, share_link};

#[derive(Args, Debug)]
pub struct ShareArgs {
    #[command(subcommand)]
    pub command: ShareCommand,
}

#[derive(Subcommand, Debug)]
pub enum ShareCommand {
    /// Print a link carrying the current settings
    Create {
        /// Address to append the token to (default from config)
        #[arg(long)]
        base: Option<String>,
    },

    /// Apply the settings carried by a link
    Open {
        /// Link containing a `config` parameter
        link: String,
    },
}

pub fn run(ctx: &CommandContext, args: &ShareArgs) -> Result<()> {
    let mut store = open_store(&ctx.config)?;
    match &args.command {
        ShareCommand::Create { base } => {
            let base = base.as_deref().unwrap_or(&ctx.config.share.base_url);
            let link = share_link(base, store.settings())?;
            if ctx.robot_mode {
                emit_json(&json!({ "link": link }))
            } else {
                println!("{link}");
                Ok(())
            }
        }
        ShareCommand::Open { link } => {
            let (applied, address) = open(&mut store, link)?;
            if ctx.robot_mode {
                return emit_json(&json!({
                    "applied": applied,
                    "address": address,
                    "settings": store.settings().redacted(),
                }));
            }
            if applied {
                println!("{}", "Settings applied from share link".green());
            } else {
                println!("{}", "Link carried no usable settings; nothing changed".yellow());
            }
            println!("{address}");
            Ok(())
        }
    }
}

/// Apply `link` to the store. Returns whether settings were applied and the
/// address with the token stripped.
pub fn open(store: &mut SettingsStore, link: &str) -> Result<(bool, String)> {
    let outcome = consume_share_link(link);
    let Some(settings) = outcome.settings else {
        warn!(address = %outcome.address, "No settings applied from share link");
        return Ok((false, outcome.address));
    };
    store.replace(settings)?;
    Ok((true, outcome.address))
}
