//! Runs retrievals off the UI loop.
//!
//! Each ticket gets its own short-lived thread; results come back over a
//! channel and are applied by whoever owns the `FetchController`.
//! Retrievals cannot be cancelled, so the worker counts the ones still running
//! and warns when they pile up behind a slow source.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use serde_json::Value;
use tracing::{debug, warn};

use crate::data::DataSource;
use crate::error::FetchError;
use crate::fetch::FetchTicket;

pub type FetchOutcome = (FetchTicket, Result<Value, FetchError>);

/// In-flight count at which `spawn` starts warning.
pub const IN_FLIGHT_WARN: usize = 4;

pub struct FetchWorker {
    source: Arc<dyn DataSource>,
    tx: Sender<FetchOutcome>,
    rx: Receiver<FetchOutcome>,
    in_flight: Arc<AtomicUsize>,
}

/// Decrements the in-flight count when the fetch thread finishes, even by panic.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FetchWorker {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            tx,
            rx,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Background retrievals that have not returned yet, stale ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }

    /// Start the retrieval for `ticket` in the background.
    pub fn spawn(&self, ticket: FetchTicket) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        if running >= IN_FLIGHT_WARN {
            warn!(running, generation = ticket.generation, "fetches piling up behind a slow source");
        } else {
            debug!(running, generation = ticket.generation, "fetch started");
        }
        let guard = InFlight(Arc::clone(&self.in_flight));
        let spawned = thread::Builder::new()
            .name(format!("fetch-{}", ticket.generation))
            .spawn(move || {
                let _guard = guard;
                let result = source.fetch(ticket.selection);
                // The receiver is gone only when the UI has shut down.
                let _ = tx.send((ticket, result));
            });

        if let Err(e) = spawned {
            warn!(generation = ticket.generation, error = %e, "failed to spawn fetch thread");
            let _ = self
                .tx
                .send((ticket, Err(FetchError::Transport(format!("failed to spawn fetch: {e}")))));
        }
    }

    /// Results that have arrived since the last call, in arrival order.
    pub fn drain(&self) -> Vec<FetchOutcome> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(outcome) => {
                    debug!(generation = outcome.0.generation, "fetch result received");
                    out.push(outcome);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Run the retrieval on the calling thread. Used by one-shot commands.
    pub fn fetch_blocking(&self, ticket: FetchTicket) -> FetchOutcome {
        (ticket, self.source.fetch(ticket.selection))
    }
}
