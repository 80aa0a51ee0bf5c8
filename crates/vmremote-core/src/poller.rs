//! Change detection
//!
//! A dedicated thread asks the engine whether anything changed once per
//! interval and, when it did, runs every registered listener in
//! registration order. Listeners are isolated from each other: a panic in
//! one is logged and the rest still run.
//!
//! The thread is stopped through a crossbeam channel. Dropping the sender
//! wakes the thread immediately instead of waiting out the interval.

use crate::error::Result;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread::JoinHandle;
use std::time::Duration;

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Identifies one registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Listeners keyed by a monotonically increasing id
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<ListenerId, Listener>>,
}

impl ListenerRegistry {
    pub(crate) fn register(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, listener);
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Run every listener once, in registration order
    ///
    /// Works on a snapshot so listeners may register or unsubscribe
    /// without deadlocking. Returns how many listeners panicked.
    pub(crate) fn notify(&self) -> usize {
        let snapshot: Vec<(ListenerId, Listener)> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, l)| (*id, Arc::clone(l)))
            .collect();

        let mut failures = 0;
        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener())).is_err() {
                failures += 1;
                tracing::error!(listener = id.0, "Change listener panicked");
            }
        }
        failures
    }
}

/// Handle returned by [`crate::Remote::on_change`]
///
/// Dropping it leaves the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    pub(crate) fn new(id: ListenerId, registry: &Arc<ListenerRegistry>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the listener; false if it was already gone
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .map(|r| r.remove(self.id))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Background dirty-flag poller
pub(crate) struct ChangePoller {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ChangePoller {
    /// Start polling `check` every `interval`
    ///
    /// `check` returns whether the engine reported a change. Errors are
    /// logged and polling continues.
    pub(crate) fn spawn<F>(interval: Duration, registry: Arc<ListenerRegistry>, mut check: F) -> Self
    where
        F: FnMut() -> Result<bool> + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let thread = std::thread::Builder::new()
            .name("vmremote-poller".to_string())
            .spawn(move || {
                tracing::debug!(interval_ms = interval.as_millis() as u64, "Change poller started");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    match check() {
                        Ok(true) => {
                            registry.notify();
                        }
                        Ok(false) => {}
                        Err(e) => tracing::debug!(error = %e, "Dirty check failed"),
                    }
                }
                tracing::debug!("Change poller stopped");
            })
            .map_err(|e| tracing::error!(error = %e, "Failed to spawn change poller"))
            .ok();

        Self {
            stop_tx: Some(stop_tx),
            thread,
        }
    }

    /// Stop the thread and wait for it, unless called from the poller itself
    pub(crate) fn stop(&mut self) {
        self.stop_tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.thread().id() != std::thread::current().id() {
                let _ = thread.join();
            }
        }
    }
}

impl Drop for ChangePoller {
    fn drop(&mut self) {
        self.stop();
    }
}
