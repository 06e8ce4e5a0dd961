//! Output helpers shared by commands.

use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::render::DisplayCard;

/// Print a value as pretty JSON on stdout.
pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

/// Aligned `key: value` lines for human output.
pub struct HumanLayout {
    lines: Vec<(String, String)>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 0,
        }
    }

    pub fn kv(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.key_width = self.key_width.max(key.len());
        self.lines.push((key.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn build(&self) -> String {
        self.lines
            .iter()
            .map(|(key, value)| format!("{:<width$}  {value}", key.bold(), width = self.key_width))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Check mark or cross for a boolean signal.
#[must_use]
pub fn status_mark(ok: bool) -> String {
    if ok {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

/// Human rendering of one result card.
#[must_use]
pub fn format_card(position: usize, id: &str, card: &DisplayCard) -> String {
    let mut out = format!("{:>2}. {}", position, card.title.bold());
    if !id.is_empty() {
        out.push_str(&format!(" {}", format!("[{id}]").dimmed()));
    }
    out.push_str(&format!("\n    {}", card.description));
    if let Some(url) = &card.image_url {
        out.push_str(&format!("\n    {} {url}", "image:".cyan()));
    }
    out
}
