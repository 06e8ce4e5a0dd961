//! Wiring: one settings store, one session, one dispatcher.
//!
//! [`AppContext`] is what the TUI and the headless commands drive. Mutations
//! go through [`AppContext::store_mut`]; [`AppContext::pump`] then feeds new
//! snapshots to the session, dispatches the resulting jobs and commits any
//! completions that have arrived.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, warn};

use crate::config::Config;
use crate::engine::{Completion, Dispatcher, Session};
use crate::error::{Result, SpError};
use crate::remote::{HttpBackend, SearchBackend};
use crate::settings::{FileBlobStore, SettingsStore, Snapshot};

pub struct AppContext {
    pub config: Config,
    store: SettingsStore,
    session: Session,
    dispatcher: Dispatcher,
    snapshots: Receiver<Snapshot>,
    completions: Receiver<Completion>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("store", &self.store)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Production wiring: file-backed store and the HTTP backend.
    pub fn open(config: Config) -> Result<Self> {
        let dir = config.storage_dir()?;
        let store = SettingsStore::open(Box::new(FileBlobStore::new(dir)));
        let backend = HttpBackend::new(&config.http)?;
        Ok(Self::with_parts(config, store, Arc::new(backend)))
    }

    pub fn with_parts(
        config: Config,
        mut store: SettingsStore,
        backend: Arc<dyn SearchBackend>,
    ) -> Self {
        let snapshots = store.subscribe();
        let (dispatcher, completions) = Dispatcher::new(backend);
        Self {
            config,
            store,
            session: Session::new(),
            dispatcher,
            snapshots,
            completions,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Mutable access for the single writer. Call [`Self::pump`] afterwards.
    pub fn store_mut(&mut self) -> &mut SettingsStore {
        &mut self.store
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Process pending snapshots and completions without blocking.
    ///
    /// Returns true when anything visible may have changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = self.observe_snapshots();
        while let Ok(completion) = self.completions.try_recv() {
            self.commit(completion);
            changed = true;
        }
        changed
    }

    /// Pump until no job is outstanding or `timeout` elapses.
    pub fn wait_idle(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        self.pump();
        while self.session.is_busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.completions.recv_timeout(remaining) {
                Ok(completion) => {
                    self.commit(completion);
                    self.observe_snapshots();
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(SpError::Timeout(format!(
                        "engine still busy after {}s",
                        timeout.as_secs()
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        Ok(())
    }

    fn observe_snapshots(&mut self) -> bool {
        let mut latest = None;
        while let Ok(snapshot) = self.snapshots.try_recv() {
            latest = Some(snapshot);
        }
        let Some(snapshot) = latest else {
            return false;
        };
        debug!(revision = snapshot.revision, "Observing settings snapshot");
        let jobs = self.session.observe(&snapshot);
        self.dispatcher.dispatch_all(jobs);
        true
    }

    fn commit(&mut self, completion: Completion) {
        if let Some(fixed) = self.session.complete(completion) {
            if let Err(e) = self.store.replace(fixed) {
                warn!(error = %e, "Failed to persist corrected settings");
            }
        }
    }
}
