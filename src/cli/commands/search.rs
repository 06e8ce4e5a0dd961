//! searchpane search - Run one query through the search pipeline
//!
//! Applies the query text to the saved settings, waits for the engine to
//! settle and prints the rendered cards. An empty query shows the browse-all
//! results.

use clap::Args;
use colored::Colorize;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::CommandContext;
use crate::cli::commands::settle_timeout;
use crate::cli::output::{emit_json, format_card};
use crate::error::{Result, SpError};
use crate::render::document_id;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Query text (may be empty for browse-all)
    pub query: String,
}

pub fn run(ctx: &CommandContext, args: &SearchArgs) -> Result<()> {
    let app = AppContext::open(ctx.config.clone())?;
    let app = execute(app, &args.query, ctx)?;
    let session = app.session();
    let settings = app.store().settings();

    if ctx.robot_mode {
        let cards = session.cards();
        let hybrid = settings
            .hybrid()
            .map(|(embedder, ratio)| json!({ "embedder": embedder, "semanticRatio": ratio }));
        return emit_json(&json!({
            "query": args.query,
            "index": settings.index,
            "hybrid": hybrid,
            "count": session.results().len(),
            "hits": session.results(),
            "cards": cards,
        }));
    }

    if session.results().is_empty() {
        println!("{}", "No results".dimmed());
        return Ok(());
    }

    let mode = settings
        .hybrid()
        .map_or_else(|| "lexical".to_string(), |(embedder, ratio)| format!("hybrid {embedder} {ratio:.1}"));
    println!(
        "{} {} in {} ({mode})",
        session.results().len().to_string().bold(),
        "results".bold(),
        settings.index.cyan()
    );
    for (position, (doc, card)) in session.results().iter().zip(session.cards()).enumerate() {
        println!("{}", format_card(position + 1, &document_id(doc), &card));
    }
    Ok(())
}

/// Apply `query` and wait until every outstanding job has settled.
pub fn execute(mut app: AppContext, query: &str, ctx: &CommandContext) -> Result<AppContext> {
    let missing = app.store().settings().missing_required();
    if !missing.is_empty() {
        return Err(SpError::MissingConfig(format!(
            "{} (set with `searchpane config set`)",
            missing.join(", ")
        )));
    }

    app.store_mut().set_query_text(query);
    app.wait_idle(settle_timeout(&ctx.config))?;
    Ok(app)
}
