//! Background eviction thread.

use std::{
    fmt::Debug,
    hash::Hash,
    io,
    sync::{
        Weak,
        mpsc::{self, RecvTimeoutError, Sender},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{debug, trace, warn};

use super::CacheStore;

const SWEEPER_THREAD_NAME: &str = "hydrate-cache-sweeper";

/// Handle to the sweeper thread owned by a [`super::Cache`].
///
/// The thread holds only a weak reference to the store, so it never keeps a
/// dropped cache alive, and it exits on the first tick after the store is gone.
pub(super) struct Sweeper {
    stop_signal: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    pub(super) fn spawn<K, V>(store: Weak<CacheStore<K, V>>, interval: Duration) -> io::Result<Self>
    where
        K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let (stop_signal, stop_requests) = mpsc::channel::<()>();
        let handle = thread::Builder::new().name(SWEEPER_THREAD_NAME.to_string()).spawn(move || {
            debug!(interval_ms = interval.as_millis() as u64, "cache sweeper started");
            loop {
                match stop_requests.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let Some(store) = store.upgrade() else {
                            debug!("cache dropped; cache sweeper exiting");
                            break;
                        };
                        let removed = store.sweep_expired();
                        trace!(removed, remaining = store.entries.len(), "cache sweep completed");
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("cache sweeper stopped");
        })?;

        Ok(Self {
            stop_signal,
            handle: Some(handle),
        })
    }

    /// Signal the thread to stop and wait for it to exit.
    pub(super) fn stop(mut self) {
        // A send error means the thread already exited on its own.
        let _ = self.stop_signal.send(());
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("cache sweeper thread panicked");
        }
    }
}
