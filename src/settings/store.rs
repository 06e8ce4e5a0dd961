//! Observable settings container.
//!
//! The store is the only shared mutable state in the application. It has a
//! single writer (the settings panel, the `config`/`share` commands, or the
//! engine's embedder reconciliation routed through the owner) and any number
//! of subscribers. Every accepted mutation bumps the revision and sends a full
//! [`Snapshot`] to each subscriber; the settings half is persisted, the query
//! text never is.

use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Settings;
use super::storage::BlobStore;
use crate::error::Result;

/// Name of the persisted blob.
pub const STORAGE_NAME: &str = "search-store";

const STORAGE_VERSION: u32 = 0;

/// Immutable view of the store at one revision.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub settings: Settings,
    pub query_text: String,
    pub revision: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    settings: Settings,
}

pub struct SettingsStore {
    current: Snapshot,
    blob: Box<dyn BlobStore>,
    subscribers: Vec<Sender<Snapshot>>,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("revision", &self.current.revision)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// Open the store, restoring persisted settings when present.
    ///
    /// An unreadable or corrupt blob is logged and replaced by defaults.
    pub fn open(blob: Box<dyn BlobStore>) -> Self {
        let settings = match load_settings(blob.as_ref()) {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!(error = %e, "Persisted settings unreadable, using defaults");
                Settings::default()
            }
        };
        debug!(host = %settings.host, index = %settings.index, "Settings store opened");
        Self {
            current: Snapshot {
                settings,
                query_text: String::new(),
                revision: 0,
            },
            blob,
            subscribers: Vec::new(),
        }
    }

    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.current
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.current.settings
    }

    #[must_use]
    pub fn query_text(&self) -> &str {
        &self.current.query_text
    }

    /// Register a subscriber. The current snapshot is delivered immediately.
    pub fn subscribe(&mut self) -> Receiver<Snapshot> {
        let (tx, rx) = unbounded();
        // The receiver is alive, so this cannot fail.
        let _ = tx.send(self.current.clone());
        self.subscribers.push(tx);
        rx
    }

    /// Replace the whole settings record.
    ///
    /// Returns `Ok(false)` when nothing changed. Subscribers are notified
    /// before persisting; a persistence failure is returned but the new
    /// settings stay in effect.
    pub fn replace(&mut self, settings: Settings) -> Result<bool> {
        let settings = settings.sanitized();
        if settings == self.current.settings {
            return Ok(false);
        }
        self.current.settings = settings;
        self.publish();
        self.persist()?;
        Ok(true)
    }

    /// Edit a copy of the settings and replace them with it.
    pub fn update(&mut self, edit: impl FnOnce(&mut Settings)) -> Result<bool> {
        let mut next = self.current.settings.clone();
        edit(&mut next);
        self.replace(next)
    }

    /// Set the transient query text. Never persisted.
    pub fn set_query_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.current.query_text {
            return false;
        }
        self.current.query_text = text;
        self.publish();
        true
    }

    /// Restore defaults and drop the persisted blob.
    pub fn reset(&mut self) -> Result<()> {
        self.current.settings = Settings::default();
        self.publish();
        self.blob.remove(STORAGE_NAME)
    }

    fn publish(&mut self) {
        self.current.revision += 1;
        let snapshot = &self.current;
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    fn persist(&self) -> Result<()> {
        let envelope = Envelope {
            state: PersistedState {
                settings: self.current.settings.clone(),
            },
            version: STORAGE_VERSION,
        };
        let blob = serde_json::to_string(&envelope)?;
        self.blob.save(STORAGE_NAME, &blob)
    }
}

fn load_settings(blob: &dyn BlobStore) -> Result<Option<Settings>> {
    let Some(raw) = blob.load(STORAGE_NAME)? else {
        return Ok(None);
    };
    let envelope: Envelope = serde_json::from_str(&raw)?;
    Ok(Some(envelope.state.settings.sanitized()))
}
