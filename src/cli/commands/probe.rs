//! searchpane probe - Check connectivity and index metadata

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::CommandContext;
use crate::cli::commands::settle_timeout;
use crate::cli::output::{HumanLayout, emit_json, status_mark};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ProbeArgs {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub host: String,
    pub host_reachable: bool,
    pub key_authorized: bool,
    pub indexes: Vec<String>,
    pub index: String,
    pub embedders: Vec<String>,
    pub fields: Vec<String>,
}

pub fn run(ctx: &CommandContext, _args: &ProbeArgs) -> Result<()> {
    let app = AppContext::open(ctx.config.clone())?;
    let report = probe(app, ctx)?;

    if ctx.robot_mode {
        return emit_json(&report);
    }

    let none = || "-".to_string();
    let join = |items: &[String]| if items.is_empty() { none() } else { items.join(", ") };
    let mut layout = HumanLayout::new();
    layout
        .kv("host", format!("{} {}", status_mark(report.host_reachable), or(&report.host, "(not set)")))
        .kv("api key", status_mark(report.key_authorized))
        .kv("indexes", join(&report.indexes))
        .kv("index", or(&report.index, "(not set)"))
        .kv("embedders", join(&report.embedders))
        .kv("fields", join(&report.fields));
    println!("{}", layout.build());
    Ok(())
}

/// Run the prober and resolver for the saved settings.
pub fn probe(mut app: AppContext, ctx: &CommandContext) -> Result<ProbeReport> {
    app.wait_idle(settle_timeout(&ctx.config))?;
    let settings = app.store().settings();
    let session = app.session();
    let connectivity = session.connectivity();
    let metadata = session.metadata();
    Ok(ProbeReport {
        host: settings.host.clone(),
        host_reachable: connectivity.host_reachable,
        key_authorized: connectivity.key_authorized,
        indexes: connectivity.indexes.clone(),
        index: settings.index.clone(),
        embedders: metadata.embedders.iter().cloned().collect(),
        fields: metadata.fields.iter().cloned().collect(),
    })
}

fn or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
