//! The remote search engine, seen through one narrow trait.
//!
//! Everything above this module talks to [`SearchBackend`]; [`http::HttpBackend`]
//! is the production implementation and tests substitute scripted backends.

pub mod http;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::settings::Settings;

pub use http::HttpBackend;

/// Fixed page size for every search.
pub const PAGE_SIZE: usize = 10;

/// One schema-less result document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Host plus credential: everything needed for an authorized call.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    pub host: String,
    pub api_key: String,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Connection {
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
        }
    }

    /// `None` unless both host and key are set.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        settings
            .has_connection()
            .then(|| Self::new(settings.host.trim(), settings.api_key.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridParams {
    pub semantic_ratio: f64,
    pub embedder: String,
}

/// Body of `POST /indexes/{index}/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub q: String,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hybrid: Option<HybridParams>,
}

impl SearchRequest {
    /// Build the request for `text` under the current settings.
    #[must_use]
    pub fn from_settings(text: &str, settings: &Settings) -> Self {
        Self {
            q: text.to_string(),
            limit: PAGE_SIZE,
            hybrid: settings
                .hybrid()
                .map(|(embedder, semantic_ratio)| HybridParams {
                    semantic_ratio,
                    embedder,
                }),
        }
    }
}

/// Embedders and field names reported for one index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexMetadata {
    pub embedders: BTreeSet<String>,
    pub fields: BTreeSet<String>,
}

/// Blocking access to a remote engine.
///
/// Implementations are called from worker threads, one call per job.
pub trait SearchBackend: Send + Sync {
    /// `GET /health`; `Ok` means reachable.
    fn health(&self, host: &str) -> Result<()>;

    /// `GET /indexes`, returning index uids.
    fn list_indexes(&self, conn: &Connection) -> Result<Vec<String>>;

    /// Embedders and field names of `index`. Fails if either lookup fails.
    fn index_metadata(&self, conn: &Connection, index: &str) -> Result<IndexMetadata>;

    /// `POST /indexes/{index}/search`, returning hits in engine order.
    fn search(&self, conn: &Connection, index: &str, request: &SearchRequest)
    -> Result<Vec<Document>>;
}
