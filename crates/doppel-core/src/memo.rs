//! Compute-once-and-remember wrapper over the session store

use crate::session::SessionState;
use crate::Outcome;
use tracing::{debug, trace};

/// Memoizes the outcome of a fallible operation under a session key.
///
/// `invoke` runs the operation synchronously on the caller; asynchrony
/// is layered on top by [`TaskHandle`](crate::task::TaskHandle). The
/// memoizer caches *results*, not *execution*: both success and
/// failure outcomes are remembered until explicitly invalidated, so a
/// failed remote call is not retried on every render pass.
pub struct Memoizer<'a> {
    state: &'a mut SessionState,
}

impl<'a> Memoizer<'a> {
    /// Wrap the given session store.
    pub fn new(state: &'a mut SessionState) -> Self {
        Self { state }
    }

    /// Return the cached outcome for `key`, or run `op`, cache its
    /// outcome and return it. The operation executes at most once per
    /// key until [`invalidate`](Self::invalidate).
    pub fn invoke<T, F>(&mut self, key: &str, op: F) -> Outcome<T>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> Outcome<T>,
    {
        if let Some(cached) = self.state.get::<Outcome<T>>(key) {
            trace!("memoizer hit for '{}'", key);
            return cached.clone();
        }
        debug!("memoizer miss for '{}', executing", key);
        let outcome = op();
        self.state.set(key, outcome.clone());
        outcome
    }

    /// Whether an outcome of type `T` is cached under `key`.
    pub fn is_done<T: Clone + Send + 'static>(&self, key: &str) -> bool {
        self.state.get::<Outcome<T>>(key).is_some()
    }

    /// Drop any cached outcome for `key`, releasing resources it owns.
    ///
    /// Safe to call with a background task for the key still in
    /// flight: the task is not cancelled, and the completion path is
    /// responsible for re-checking that its key is still current
    /// before writing (see the prediction job).
    pub fn invalidate(&mut self, key: &str) {
        if self.state.remove(key) {
            debug!("memoizer invalidated '{}'", key);
        }
    }
}
