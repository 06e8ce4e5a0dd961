//! Schema-less result documents to display cards.
//!
//! Documents come back from the engine with whatever fields the index holds.
//! The three configured attribute names pick the title, description and image;
//! anything missing, empty or not a string degrades to a fixed label.

use serde::Serialize;
use serde_json::Value;

use crate::remote::Document;

pub const NO_TITLE: &str = "No title";
pub const NO_DESCRIPTION: &str = "No description";
pub const DEFAULT_IMAGE_ALT: &str = "Search result image";

/// Which document fields feed the card. Empty means "not configured".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayAttrs {
    pub title: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayCard {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub image_alt: String,
}

/// Non-empty string at `attr`, if `attr` is configured.
#[must_use]
pub fn string_field<'a>(doc: &'a Document, attr: &str) -> Option<&'a str> {
    if attr.is_empty() {
        return None;
    }
    match doc.get(attr) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

#[must_use]
pub fn render_card(doc: &Document, attrs: &DisplayAttrs) -> DisplayCard {
    let title = string_field(doc, &attrs.title);
    DisplayCard {
        title: title.unwrap_or(NO_TITLE).to_string(),
        description: string_field(doc, &attrs.description)
            .unwrap_or(NO_DESCRIPTION)
            .to_string(),
        image_url: string_field(doc, &attrs.image).map(str::to_string),
        image_alt: title.unwrap_or(DEFAULT_IMAGE_ALT).to_string(),
    }
}

/// Display text for the document's `id`.
#[must_use]
pub fn document_id(doc: &Document) -> String {
    match doc.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
