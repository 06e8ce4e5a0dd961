//! searchpane tui - Interactive search UI

use clap::Args;
use tracing::{info, warn};

use crate::app::AppContext;
use crate::cli::CommandContext;
use crate::error::{Result, SpError};
use crate::settings::consume_share_link;
use crate::tui::run_search_tui;

#[derive(Args, Debug)]
pub struct TuiArgs {
    /// Share link to apply before starting
    #[arg(long)]
    pub link: Option<String>,
}

pub fn run(ctx: &CommandContext, args: &TuiArgs) -> Result<()> {
    if ctx.robot_mode {
        return Err(SpError::ValidationFailed(
            "tui command cannot run in robot mode".to_string(),
        ));
    }

    let mut app = AppContext::open(ctx.config.clone())?;

    if let Some(link) = &args.link {
        let outcome = consume_share_link(link);
        match outcome.settings {
            Some(settings) => {
                app.store_mut().replace(settings)?;
                info!(address = %outcome.address, "Applied share link");
            }
            None => warn!(address = %outcome.address, "Share link carried no usable settings"),
        }
    }

    run_search_tui(app)
}
