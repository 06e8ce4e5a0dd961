//! searchpane config - Show or edit the saved search settings

use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;

use crate::cli::CommandContext;
use crate::cli::commands::open_store;
use crate::cli::output::{HumanLayout, emit_json};
use crate::config::Config;
use crate::error::{Result, SpError};
use crate::settings::store::STORAGE_NAME;
use crate::settings::{FileBlobStore, Settings, SettingsStore};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the saved settings
    Show {
        /// Print the API key unmasked
        #[arg(long)]
        reveal: bool,
    },

    /// Change one or more settings
    Set(SetArgs),

    /// Restore defaults and delete the saved settings
    Reset,

    /// Print where settings and config are stored
    Path,
}

#[derive(Args, Debug, Default)]
pub struct SetArgs {
    /// Engine base URL
    #[arg(long)]
    pub host: Option<String>,

    /// Bearer API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Index uid (a different index clears the embedder unless --embedder is also given)
    #[arg(long)]
    pub index: Option<String>,

    /// Embedder name; empty disables hybrid search
    #[arg(long)]
    pub embedder: Option<String>,

    /// Semantic ratio between 0.0 and 1.0
    #[arg(long)]
    pub hybrid_ratio: Option<f64>,

    /// Field shown as the card title
    #[arg(long)]
    pub title_attr: Option<String>,

    /// Field shown as the card description
    #[arg(long)]
    pub desc_attr: Option<String>,

    /// Field holding the card image URL
    #[arg(long)]
    pub image_attr: Option<String>,
}

pub fn run(ctx: &CommandContext, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommand::Show { reveal } => {
            let store = open_store(&ctx.config)?;
            show(ctx, store.settings(), *reveal)
        }
        ConfigCommand::Set(set) => {
            let mut store = open_store(&ctx.config)?;
            let changed = apply_set(&mut store, set)?;
            if !ctx.robot_mode {
                let note = if changed { "Settings saved" } else { "Settings unchanged" };
                println!("{}", note.green());
            }
            show(ctx, store.settings(), false)
        }
        ConfigCommand::Reset => {
            let mut store = open_store(&ctx.config)?;
            store.reset()?;
            if ctx.robot_mode {
                emit_json(&json!({ "status": "ok", "reset": true }))
            } else {
                println!("{}", "Settings reset to defaults".green());
                Ok(())
            }
        }
        ConfigCommand::Path => path(ctx),
    }
}

/// Apply `set` as one whole-record replace.
pub fn apply_set(store: &mut SettingsStore, set: &SetArgs) -> Result<bool> {
    if let Some(ratio) = set.hybrid_ratio {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(SpError::ValidationFailed(format!(
                "hybrid ratio must be between 0.0 and 1.0, got {ratio}"
            )));
        }
    }

    let mut next = store.settings().clone();
    if let Some(host) = &set.host {
        next.host = host.trim().to_string();
    }
    if let Some(key) = &set.api_key {
        next.api_key.clone_from(key);
    }
    if let Some(index) = &set.index {
        if *index != next.index {
            next = next.with_index(index.clone());
        }
    }
    if let Some(embedder) = &set.embedder {
        next.embedder.clone_from(embedder);
    }
    if let Some(ratio) = set.hybrid_ratio {
        next.hybrid_ratio = ratio;
    }
    if let Some(attr) = &set.title_attr {
        next.title_attr.clone_from(attr);
    }
    if let Some(attr) = &set.desc_attr {
        next.desc_attr.clone_from(attr);
    }
    if let Some(attr) = &set.image_attr {
        next.image_attr.clone_from(attr);
    }
    store.replace(next)
}

fn show(ctx: &CommandContext, settings: &Settings, reveal: bool) -> Result<()> {
    let settings = if reveal { settings.clone() } else { settings.redacted() };
    if ctx.robot_mode {
        return emit_json(&settings);
    }

    let value = |v: &str| {
        if v.is_empty() {
            "(not set)".dimmed().to_string()
        } else {
            v.to_string()
        }
    };
    let mut layout = HumanLayout::new();
    layout
        .kv("host", value(&settings.host))
        .kv("apiKey", value(&settings.api_key))
        .kv("index", value(&settings.index))
        .kv("embedder", value(&settings.embedder))
        .kv("hybridRatio", format!("{:.1}", settings.hybrid_ratio))
        .kv("titleAttr", value(&settings.title_attr))
        .kv("descAttr", value(&settings.desc_attr))
        .kv("imageAttr", value(&settings.image_attr));
    println!("{}", layout.build());
    Ok(())
}

fn path(ctx: &CommandContext) -> Result<()> {
    let settings_path = FileBlobStore::new(ctx.config.storage_dir()?).path_for(STORAGE_NAME);
    let config_path = Config::global_path();
    if ctx.robot_mode {
        return emit_json(&json!({
            "settings": settings_path,
            "config": config_path,
        }));
    }
    let mut layout = HumanLayout::new();
    layout.kv("settings", settings_path.display().to_string()).kv(
        "config",
        config_path.map_or_else(|| "(none)".to_string(), |p| p.display().to_string()),
    );
    println!("{}", layout.build());
    Ok(())
}
