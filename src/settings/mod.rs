//! User-facing search settings and the observable store that holds them.
//!
//! [`Settings`] is the single record the settings panel edits: where the
//! engine lives, which index to query, whether hybrid search is on, and which
//! document fields to show. The [`store::SettingsStore`] owns it together with
//! the transient query text and notifies subscribers on every change.

pub mod share;
pub mod storage;
pub mod store;

use serde::{Deserialize, Serialize};

pub use share::{ShareLinkOutcome, consume_share_link, decode_token, encode_token, share_link};
pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use store::{SettingsStore, Snapshot};

/// Default semantic-vs-lexical blend.
pub const DEFAULT_HYBRID_RATIO: f64 = 0.5;

/// Connection, index and display settings.
///
/// Every string field uses the empty string for "not configured".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(alias = "url")]
    pub host: String,
    pub api_key: String,
    pub index: String,
    pub embedder: String,
    pub hybrid_ratio: f64,
    pub title_attr: String,
    pub desc_attr: String,
    pub image_attr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: String::new(),
            api_key: String::new(),
            index: String::new(),
            embedder: String::new(),
            hybrid_ratio: DEFAULT_HYBRID_RATIO,
            title_attr: String::new(),
            desc_attr: String::new(),
            image_attr: String::new(),
        }
    }
}

impl Settings {
    /// Select a new index. Any previously chosen embedder is dropped, even
    /// when the new index happens to expose an embedder of the same name.
    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self.embedder.clear();
        self
    }

    /// Clamp the ratio into `[0.0, 1.0]`; NaN falls back to the default.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.hybrid_ratio = clamp_ratio(self.hybrid_ratio);
        self
    }

    /// True when host and key are both set.
    #[must_use]
    pub fn has_connection(&self) -> bool {
        !self.host.trim().is_empty() && !self.api_key.is_empty()
    }

    /// True when everything needed to issue a search is present.
    #[must_use]
    pub fn is_searchable(&self) -> bool {
        self.has_connection() && !self.index.is_empty()
    }

    /// Names of required fields that are still empty, in display order.
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.host.trim().is_empty() {
            missing.push("host");
        }
        if self.api_key.is_empty() {
            missing.push("apiKey");
        }
        if self.index.is_empty() {
            missing.push("index");
        }
        missing
    }

    /// Hybrid parameters, present only when an embedder is selected.
    #[must_use]
    pub fn hybrid(&self) -> Option<(String, f64)> {
        if self.embedder.is_empty() {
            None
        } else {
            Some((self.embedder.clone(), clamp_ratio(self.hybrid_ratio)))
        }
    }

    /// The three display attribute names.
    #[must_use]
    pub fn display_attrs(&self) -> crate::render::DisplayAttrs {
        crate::render::DisplayAttrs {
            title: self.title_attr.clone(),
            description: self.desc_attr.clone(),
            image: self.image_attr.clone(),
        }
    }

    /// Copy with the API key masked, for display and logs.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api_key = mask_secret(&self.api_key);
        copy
    }
}

/// Clamp a ratio into `[0.0, 1.0]`.
#[must_use]
pub fn clamp_ratio(value: f64) -> f64 {
    if value.is_nan() {
        DEFAULT_HYBRID_RATIO
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}
