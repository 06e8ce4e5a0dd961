//! Embedders and field names of the selected index.

use tracing::{debug, warn};

use super::guard::{Latest, Ticket};
use super::jobs::Job;
use crate::error::Result;
use crate::remote::{Connection, IndexMetadata};
use crate::settings::Settings;

/// Inputs one resolution depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataKey {
    pub conn: Connection,
    pub index: String,
}

impl MetadataKey {
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

#[derive(Debug, Default)]
pub struct MetadataResolver {
    guard: Latest<MetadataKey>,
    metadata: IndexMetadata,
}

impl MetadataResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    #[must_use]
    pub const fn is_resolving(&self) -> bool {
        self.guard.in_flight()
    }

    /// Re-derive from `settings`. Metadata for a previous index is cleared
    /// as soon as the inputs change.
    pub fn observe(&mut self, settings: &Settings) -> Option<Job> {
        match MetadataKey::from_settings(settings) {
            None => {
                self.guard.invalidate();
                self.metadata = IndexMetadata::default();
                None
            }
            Some(key) if self.guard.key() != Some(&key) => {
                self.metadata = IndexMetadata::default();
                Some(Job::Metadata(self.guard.issue(key)))
            }
            Some(_) => None,
        }
    }

    /// Commit a resolution. Returns the committed metadata when the ticket
    /// was current and the fetch succeeded.
    pub fn complete(
        &mut self,
        ticket: &Ticket<MetadataKey>,
        outcome: Result<IndexMetadata>,
    ) -> Option<&IndexMetadata> {
        if !self.guard.settle(ticket) {
            debug!(index = %ticket.key().index, "Discarding stale metadata");
            return None;
        }
        match outcome {
            Ok(metadata) => {
                debug!(
                    index = %ticket.key().index,
                    embedders = metadata.embedders.len(),
                    fields = metadata.fields.len(),
                    "Index metadata resolved"
                );
                self.metadata = metadata;
                Some(&self.metadata)
            }
            Err(e) => {
                warn!(index = %ticket.key().index, error = %e, "Index metadata unavailable");
                self.metadata = IndexMetadata::default();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::error::SpError;

    fn settings(index: &str) -> Settings {
        Settings {
            host: "http://h".to_string(),
            api_key: "k".to_string(),
            index: index.to_string(),
            ..Settings::default()
        }
    }

    fn ticket(job: Option<Job>) -> Ticket<MetadataKey> {
        match job {
            Some(Job::Metadata(ticket)) => ticket,
            other => panic!("expected metadata job, got {other:?}"),
        }
    }

    fn meta(embedders: &[&str], fields: &[&str]) -> IndexMetadata {
        IndexMetadata {
            embedders: embedders.iter().map(ToString::to_string).collect(),
            fields: fields.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn requires_connection_and_index() {
        let mut resolver = MetadataResolver::new();
        assert!(resolver.observe(&settings("")).is_none());
        let no_key = Settings {
            api_key: String::new(),
            ..settings("movies")
        };
        assert!(resolver.observe(&no_key).is_none());
    }

    #[test]
    fn resolves_once_per_index() {
        let mut resolver = MetadataResolver::new();
        let t = ticket(resolver.observe(&settings("movies")));
        assert!(resolver.is_resolving());
        assert!(resolver.observe(&settings("movies")).is_none());

        let committed = resolver.complete(&t, Ok(meta(&["default"], &["name", "photo"])));
        assert!(committed.is_some());
        assert_eq!(
            resolver.metadata().fields,
            BTreeSet::from(["name".to_string(), "photo".to_string()])
        );
    }

    #[test]
    fn index_change_clears_and_drops_stale() {
        let mut resolver = MetadataResolver::new();
        let old = ticket(resolver.observe(&settings("movies")));
        resolver.complete(&old, Ok(meta(&["a"], &["x"])));

        let new = ticket(resolver.observe(&settings("books")));
        assert_eq!(resolver.metadata(), &IndexMetadata::default());

        assert!(resolver.complete(&old, Ok(meta(&["a"], &["x"]))).is_none());
        assert_eq!(resolver.metadata(), &IndexMetadata::default());

        resolver.complete(&new, Ok(meta(&[], &["title"])));
        assert!(resolver.metadata().embedders.is_empty());
        assert_eq!(resolver.metadata().fields.len(), 1);
    }

    #[test]
    fn out_of_order_completion_keeps_latest() {
        let mut resolver = MetadataResolver::new();
        let first = ticket(resolver.observe(&settings("movies")));
        let second = ticket(resolver.observe(&settings("books")));

        resolver.complete(&second, Ok(meta(&["b"], &["b"])));
        resolver.complete(&first, Ok(meta(&["a"], &["a"])));
        assert!(resolver.metadata().embedders.contains("b"));
    }

    #[test]
    fn failure_empties_both_lists() {
        let mut resolver = MetadataResolver::new();
        let t = ticket(resolver.observe(&settings("movies")));
        assert!(resolver
            .complete(&t, Err(SpError::Http("refused".to_string())))
            .is_none());
        assert_eq!(resolver.metadata(), &IndexMetadata::default());
        assert!(!resolver.is_resolving());
    }
}
