//! Terminal UI for searchpane.
//!
//! This module provides the interactive search screen and its settings panel
//! using ratatui.

pub mod search;
pub mod settings_panel;

pub use search::{SearchTui, run_search_tui};
pub use settings_panel::SettingsPanel;
