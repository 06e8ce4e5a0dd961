//! The reactive core: prober, resolver and query engine driven by store
//! snapshots.
//!
//! [`Session`] is owned by the UI thread. Each snapshot is turned into a set
//! of [`Job`]s for the [`Dispatcher`]; each [`Completion`] coming back is
//! committed through the staleness guards of the concern that issued it.

pub mod dispatch;
pub mod guard;
pub mod jobs;
pub mod prober;
pub mod query;
pub mod resolver;

use tracing::info;

pub use dispatch::Dispatcher;
pub use guard::{Latest, Ticket};
pub use jobs::{Completion, Job};
pub use prober::{Connectivity, ConnectivityProber};
pub use query::{QueryEngine, QueryKey, QueryTarget};
pub use resolver::{MetadataKey, MetadataResolver};

use crate::remote::{Document, IndexMetadata};
use crate::render::{DisplayCard, render_card};
use crate::settings::{Settings, Snapshot};

#[derive(Debug, Default)]
pub struct Session {
    prober: ConnectivityProber,
    resolver: MetadataResolver,
    query: QueryEngine,
    settings: Settings,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-derive every concern from `snapshot`, returning the work to run.
    pub fn observe(&mut self, snapshot: &Snapshot) -> Vec<Job> {
        self.settings = snapshot.settings.clone();
        let mut jobs = self.prober.observe(&self.settings);
        jobs.extend(self.resolver.observe(&self.settings));
        jobs.extend(self.query.observe(&self.settings, &snapshot.query_text));
        jobs
    }

    /// Commit a completion.
    ///
    /// Returns corrected settings when a fresh resolution shows the stored
    /// embedder no longer exists; the owner writes them back to the store.
    pub fn complete(&mut self, completion: Completion) -> Option<Settings> {
        match completion {
            Completion::Health { ticket, outcome } => {
                self.prober.complete_health(&ticket, outcome);
                None
            }
            Completion::ListIndexes { ticket, outcome } => {
                self.prober.complete_listing(&ticket, outcome);
                None
            }
            Completion::Metadata { ticket, outcome } => {
                let metadata = self.resolver.complete(&ticket, outcome)?;
                let embedder = &self.settings.embedder;
                if embedder.is_empty() || metadata.embedders.contains(embedder) {
                    return None;
                }
                info!(embedder = %embedder, index = %self.settings.index, "Stored embedder not offered by index, clearing");
                self.query.refresh_browse();
                Some(Settings {
                    embedder: String::new(),
                    ..self.settings.clone()
                })
            }
            Completion::Query { ticket, outcome } => {
                self.query.complete(&ticket, outcome);
                None
            }
        }
    }

    #[must_use]
    pub const fn connectivity(&self) -> &Connectivity {
        self.prober.state()
    }

    #[must_use]
    pub const fn metadata(&self) -> &IndexMetadata {
        self.resolver.metadata()
    }

    #[must_use]
    pub fn results(&self) -> &[Document] {
        self.query.results()
    }

    /// Display cards for the committed results.
    #[must_use]
    pub fn cards(&self) -> Vec<DisplayCard> {
        let attrs = self.settings.display_attrs();
        self.results()
            .iter()
            .map(|doc| render_card(doc, &attrs))
            .collect()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.query.is_loading()
    }

    /// True while any job is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.query.is_busy() || self.prober.is_probing() || self.resolver.is_resolving()
    }
}
