//! Derives search requests from settings plus query text and owns the
//! displayed result set.
//!
//! Two paths feed the display:
//!
//! - **browse-all**: one empty-text query per (connection, index), issued as
//!   soon as that pair is known and cached for it;
//! - **text**: while the query text is non-empty, one query per change of
//!   text, index, embedder or ratio.
//!
//! The display guard decides which outstanding query may commit. Clearing the
//! text switches the display back to the cached browse-all results, or adopts
//! the browse-all query if it is still running.

use tracing::{debug, warn};

use super::guard::{Latest, Ticket};
use super::jobs::Job;
use crate::error::Result;
use crate::remote::{Connection, Document, SearchRequest};
use crate::settings::Settings;

/// Connection and index a query runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTarget {
    pub conn: Connection,
    pub index: String,
}

impl QueryTarget {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        if settings.index.is_empty() {
            return None;
        }
        Connection::from_settings(settings).map(|conn| Self {
            conn,
            index: settings.index.clone(),
        })
    }
}

/// Inputs a query was issued for.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryKey {
    Browse(QueryTarget),
    Text {
        target: QueryTarget,
        text: String,
        embedder: String,
        ratio: f64,
    },
}

impl QueryKey {
    #[must_use]
    pub const fn target(&self) -> &QueryTarget {
        match self {
            Self::Browse(target) | Self::Text { target, .. } => target,
        }
    }
}

#[derive(Debug, Default)]
pub struct QueryEngine {
    display: Latest<QueryKey>,
    browse: Latest<QueryKey>,
    browse_cache: Option<(QueryTarget, Vec<Document>)>,
    results: Vec<Document>,
}

impl QueryEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed result set, in engine order.
    #[must_use]
    pub fn results(&self) -> &[Document] {
        &self.results
    }

    /// True while the query that owns the display is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.display.in_flight()
    }

    /// True while any query, displayed or cached, is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.display.in_flight() || self.browse.in_flight()
    }

    /// Re-derive from the current settings and query text.
    pub fn observe(&mut self, settings: &Settings, text: &str) -> Vec<Job> {
        let Some(target) = QueryTarget::from_settings(settings) else {
            self.display.invalidate();
            self.browse.invalidate();
            self.browse_cache = None;
            self.results.clear();
            return Vec::new();
        };

        let mut jobs = Vec::new();

        let browse_key = QueryKey::Browse(target.clone());
        if self.browse.key() != Some(&browse_key) {
            self.browse_cache = None;
            let ticket = self.browse.issue(browse_key.clone());
            debug!(index = %target.index, "Issuing browse-all query");
            jobs.push(Job::Query {
                ticket,
                request: SearchRequest::from_settings("", settings),
            });
        }

        if text.is_empty() {
            self.show_browse(&target, &browse_key);
        } else {
            let text_key = QueryKey::Text {
                target,
                text: text.to_string(),
                embedder: settings.embedder.clone(),
                ratio: settings.hybrid_ratio,
            };
            if self.display.key() != Some(&text_key) {
                let ticket = self.display.issue(text_key);
                debug!(seq = ticket.seq(), "Issuing text query");
                jobs.push(Job::Query {
                    ticket,
                    request: SearchRequest::from_settings(text, settings),
                });
            }
        }

        jobs
    }

    fn show_browse(&mut self, target: &QueryTarget, browse_key: &QueryKey) {
        if self.display.key() == Some(browse_key) {
            return;
        }
        if let Some((cached_for, docs)) = &self.browse_cache {
            if cached_for == target {
                self.results = docs.clone();
                self.display.invalidate();
                return;
            }
        }
        if let Some(pending) = self.browse.pending() {
            self.display.adopt(pending.clone());
        }
    }

    /// Drop the browse-all results so the next observe issues them again.
    ///
    /// Used when the settings the cached query ran with were rewritten
    /// without changing its target.
    pub fn refresh_browse(&mut self) {
        self.browse.invalidate();
        self.browse_cache = None;
        if matches!(self.display.key(), Some(QueryKey::Browse(_))) {
            self.display.invalidate();
        }
    }

    /// Commit a finished query if it still matters. Failures become an empty
    /// result set.
    pub fn complete(&mut self, ticket: &Ticket<QueryKey>, outcome: Result<Vec<Document>>) {
        let for_browse = self.browse.settle(ticket);
        let for_display = self.display.settle(ticket);
        if !for_browse && !for_display {
            debug!(seq = ticket.seq(), "Discarding superseded query result");
            return;
        }

        let docs = outcome.unwrap_or_else(|e| {
            warn!(index = %ticket.key().target().index, error = %e, "Search failed");
            Vec::new()
        });

        if for_browse {
            self.browse_cache = Some((ticket.key().target().clone(), docs.clone()));
        }
        if for_display {
            self.results = docs;
        }
    }
}
