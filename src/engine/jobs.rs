//! Units of remote work and their results.

use super::guard::Ticket;
use super::query::QueryKey;
use super::resolver::MetadataKey;
use crate::error::Result;
use crate::remote::{Connection, Document, IndexMetadata, SearchBackend, SearchRequest};

/// One blocking backend call, tagged with the ticket it was issued under.
#[derive(Debug, Clone)]
pub enum Job {
    Health(Ticket<String>),
    ListIndexes(Ticket<Connection>),
    Metadata(Ticket<MetadataKey>),
    Query {
        ticket: Ticket<QueryKey>,
        request: SearchRequest,
    },
}

/// Result of running a [`Job`].
#[derive(Debug)]
pub enum Completion {
    Health {
        ticket: Ticket<String>,
        outcome: Result<()>,
    },
    ListIndexes {
        ticket: Ticket<Connection>,
        outcome: Result<Vec<String>>,
    },
    Metadata {
        ticket: Ticket<MetadataKey>,
        outcome: Result<IndexMetadata>,
    },
    Query {
        ticket: Ticket<QueryKey>,
        outcome: Result<Vec<Document>>,
    },
}

impl Job {
    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Health(_) => "health",
            Self::ListIndexes(_) => "indexes",
            Self::Metadata(_) => "metadata",
            Self::Query { .. } => "search",
        }
    }

    /// Execute against `backend`. Blocks for the duration of the call.
    pub fn run(self, backend: &dyn SearchBackend) -> Completion {
        match self {
            Self::Health(ticket) => {
                let outcome = backend.health(ticket.key());
                Completion::Health { ticket, outcome }
            }
            Self::ListIndexes(ticket) => {
                let outcome = backend.list_indexes(ticket.key());
                Completion::ListIndexes { ticket, outcome }
            }
            Self::Metadata(ticket) => {
                let key = ticket.key();
                let outcome = backend.index_metadata(&key.conn, &key.index);
                Completion::Metadata { ticket, outcome }
            }
            Self::Query { ticket, request } => {
                let target = ticket.key().target();
                let outcome = backend.search(&target.conn, &target.index, &request);
                Completion::Query { ticket, outcome }
            }
        }
    }
}
