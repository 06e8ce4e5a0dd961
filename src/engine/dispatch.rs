//! Runs jobs off the UI thread.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::trace;

use super::jobs::{Completion, Job};
use crate::remote::SearchBackend;

/// Spawns one short-lived worker per job; every worker sends exactly one
/// [`Completion`] back on the channel returned by [`Dispatcher::new`].
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn SearchBackend>,
    tx: Sender<Completion>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn SearchBackend>) -> (Self, Receiver<Completion>) {
        let (tx, rx) = unbounded();
        (Self { backend, tx }, rx)
    }

    pub fn dispatch(&self, job: Job) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        trace!(job = job.label(), "Dispatching job");
        thread::spawn(move || {
            let completion = job.run(backend.as_ref());
            // The receiver is gone only during shutdown.
            let _ = tx.send(completion);
        });
    }

    pub fn dispatch_all(&self, jobs: impl IntoIterator<Item = Job>) {
        for job in jobs {
            self.dispatch(job);
        }
    }
}
