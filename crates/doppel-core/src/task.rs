//! Background execution of blocking work off the render thread
//!
//! The render function must never stall on network I/O. A
//! [`TaskHandle`] owns one short-lived OS thread running a blocking
//! operation, exposes a non-blocking `is_finished` poll for use from
//! repeated render passes, and a blocking `join` for when the caller
//! decides to wait. Tasks are not cancellable: dropping a handle
//! detaches the thread, which runs to completion and whose outcome is
//! discarded.

use crate::{ApiError, Outcome};
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a background task producing a single `Outcome<T>`.
///
/// The outcome slot is written exactly once, by the task thread,
/// through its `JoinHandle`; joining publishes it to the owner. The
/// handle is exclusively owned by the component that started the task
/// and is typically parked in the session store between render passes.
pub struct TaskHandle<T> {
    thread: Option<thread::JoinHandle<Outcome<T>>>,
    joined: Option<Outcome<T>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Spawn `work` on a new thread and return immediately.
    ///
    /// Any fault inside `work` - including a panic - is captured and
    /// converted into a `Failure` outcome; a task thread never
    /// terminates the process.
    pub fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> Outcome<T> + Send + 'static,
    {
        let spawned = thread::Builder::new()
            .name("doppel-task".to_string())
            .spawn(move || match panic::catch_unwind(AssertUnwindSafe(work)) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    warn!("background task panicked: {}", message);
                    Err(ApiError::Transport(format!("task panicked: {message}")))
                }
            });

        match spawned {
            Ok(handle) => {
                debug!("spawned background task");
                Self {
                    thread: Some(handle),
                    joined: None,
                }
            }
            Err(err) => {
                warn!("failed to spawn background task: {}", err);
                Self {
                    thread: None,
                    joined: Some(Err(ApiError::transport(err))),
                }
            }
        }
    }
}

impl<T: Clone> TaskHandle<T> {
    /// Non-blocking poll: whether the task's outcome is available.
    pub fn is_finished(&self) -> bool {
        match &self.thread {
            Some(thread) => thread.is_finished(),
            None => true,
        }
    }

    /// Block until the outcome is available, then return it.
    ///
    /// Idempotent: repeated joins return the same outcome.
    pub fn join(&mut self) -> Outcome<T> {
        if let Some(thread) = self.thread.take() {
            let outcome = thread.join().unwrap_or_else(|payload| {
                Err(ApiError::Transport(format!(
                    "task thread panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });
            self.joined = Some(outcome);
        }
        match &self.joined {
            Some(outcome) => outcome.clone(),
            None => Err(ApiError::Transport("task produced no outcome".to_string())),
        }
    }

    /// Join if the task already finished, else `None` without blocking.
    pub fn try_join(&mut self) -> Option<Outcome<T>> {
        if self.is_finished() {
            Some(self.join())
        } else {
            None
        }
    }

    /// Wait up to `limit` for the task to finish, then join it.
    ///
    /// Returns `None` if the ceiling passes first. This backs the
    /// warm-start optimization: a latency trade-off, never correctness.
    pub fn join_timeout(&mut self, limit: Duration) -> Option<Outcome<T>> {
        let deadline = Instant::now() + limit;
        loop {
            if self.is_finished() {
                return Some(self.join());
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("running", &self.thread.is_some())
            .field("joined", &self.joined.is_some())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
