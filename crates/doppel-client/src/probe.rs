//! Once-per-session readiness probe against the service root
//!
//! The backend scales to zero when idle, so the very first interaction
//! of a session fires a ping to wake it. The probe runs off the render
//! thread; its outcome is memoized for the rest of the session:
//! `NotStarted -> Pinging -> {Ready, Unreachable}`, terminal unless
//! the session store itself is discarded.

use crate::api::ApiClient;
use doppel_core::{ApiError, Memoizer, Outcome, SessionState, TaskHandle};
use tracing::info;

const RESULT_KEY: &str = "readiness";
const TASK_KEY: &str = "readiness.task";

/// What the render layer should show for the backend state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Probe in flight; render "starting" and schedule another pass.
    Starting,
    /// Service answered 2xx.
    Ready,
    /// Transport failure or non-2xx answer, memoized for the session.
    Unreachable(ApiError),
}

pub struct ReadinessProbe;

impl ReadinessProbe {
    /// Drive the probe for one render pass.
    ///
    /// The first call of a session spawns the ping task and waits up
    /// to `warm_wait` for it, so a warm service renders "ready"
    /// without an intermediate flicker. Subsequent calls poll the
    /// running task without re-issuing the request; once an outcome is
    /// cached it is returned unchanged forever.
    pub fn poll(state: &mut SessionState, api: &ApiClient) -> Readiness {
        if let Some(outcome) = state.get::<Outcome<serde_json::Value>>(RESULT_KEY) {
            return Self::verdict(outcome);
        }

        if !state.contains(TASK_KEY) {
            info!("starting readiness probe");
            let client = api.clone();
            let mut handle: TaskHandle<serde_json::Value> =
                TaskHandle::spawn(move || client.ping());

            if let Some(outcome) = handle.join_timeout(api.config().warm_wait) {
                let cached = Memoizer::new(state).invoke(RESULT_KEY, || outcome);
                return Self::verdict(&cached);
            }
            state.set(TASK_KEY, handle);
            return Readiness::Starting;
        }

        let outcome = state
            .get_mut::<TaskHandle<serde_json::Value>>(TASK_KEY)
            .and_then(TaskHandle::try_join);
        match outcome {
            Some(outcome) => {
                state.remove(TASK_KEY);
                let cached = Memoizer::new(state).invoke(RESULT_KEY, || outcome);
                Self::verdict(&cached)
            }
            None => Readiness::Starting,
        }
    }

    /// Whether the probe has a memoized outcome.
    pub fn is_done(state: &SessionState) -> bool {
        state.get::<Outcome<serde_json::Value>>(RESULT_KEY).is_some()
    }

    fn verdict(outcome: &Outcome<serde_json::Value>) -> Readiness {
        match outcome {
            Ok(_) => Readiness::Ready,
            Err(error) => Readiness::Unreachable(error.clone()),
        }
    }
}
