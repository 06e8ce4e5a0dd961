//! Host reachability, key authorization and index listing.
//!
//! Two independent probes: health depends on the host alone, the listing on
//! host plus key. A failing health check never hides a successful listing.

use serde::Serialize;
use tracing::{debug, warn};

use super::guard::{Latest, Ticket};
use super::jobs::Job;
use crate::error::Result;
use crate::remote::Connection;
use crate::settings::Settings;

/// What the prober currently believes about the configured engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Connectivity {
    pub host_reachable: bool,
    pub key_authorized: bool,
    pub indexes: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ConnectivityProber {
    health: Latest<String>,
    listing: Latest<Connection>,
    state: Connectivity,
}

impl ConnectivityProber {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &Connectivity {
        &self.state
    }

    #[must_use]
    pub const fn is_probing(&self) -> bool {
        self.health.in_flight() || self.listing.in_flight()
    }

    /// Re-derive from `settings`, returning the probes to run.
    pub fn observe(&mut self, settings: &Settings) -> Vec<Job> {
        let mut jobs = Vec::new();

        let host = settings.host.trim();
        if host.is_empty() {
            self.health.invalidate();
            self.state.host_reachable = false;
        } else if self.health.key().map(String::as_str) != Some(host) {
            self.state.host_reachable = false;
            jobs.push(Job::Health(self.health.issue(host.to_string())));
        }

        match Connection::from_settings(settings) {
            None => {
                self.listing.invalidate();
                self.state.key_authorized = false;
                self.state.indexes.clear();
            }
            Some(conn) if self.listing.key() != Some(&conn) => {
                self.state.key_authorized = false;
                self.state.indexes.clear();
                jobs.push(Job::ListIndexes(self.listing.issue(conn)));
            }
            Some(_) => {}
        }

        jobs
    }

    pub fn complete_health(&mut self, ticket: &Ticket<String>, outcome: Result<()>) {
        if !self.health.settle(ticket) {
            debug!(host = %ticket.key(), "Discarding stale health result");
            return;
        }
        match outcome {
            Ok(()) => self.state.host_reachable = true,
            Err(e) => {
                debug!(host = %ticket.key(), error = %e, "Host unreachable");
                self.state.host_reachable = false;
            }
        }
    }

    pub fn complete_listing(&mut self, ticket: &Ticket<Connection>, outcome: Result<Vec<String>>) {
        if !self.listing.settle(ticket) {
            debug!(host = %ticket.key().host, "Discarding stale index listing");
            return;
        }
        match outcome {
            Ok(indexes) => {
                debug!(count = indexes.len(), "Key authorized");
                self.state.key_authorized = true;
                self.state.indexes = indexes;
            }
            Err(e) => {
                warn!(host = %ticket.key().host, error = %e, "Index listing failed");
                self.state.key_authorized = false;
                self.state.indexes.clear();
            }
        }
    }
}
