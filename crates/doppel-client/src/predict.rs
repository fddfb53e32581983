//! Memoized prediction submission keyed by (image, model) identity
//!
//! `Idle -> Submitted -> {Succeeded, Failed}`; a new upload or a model
//! switch changes the identity and sends the job back to `Idle`. The
//! network submission runs on a background task and happens exactly
//! once per identity; both success and failure outcomes are memoized
//! until the identity changes or the user explicitly retries.

use crate::api::ApiClient;
use crate::config::Model;
use crate::upload::UploadedImage;
use doppel_core::{ApiError, Memoizer, Outcome, SessionState, TaskHandle};
use tracing::{debug, info};
use url::Url;

/// Domain error code the service returns when no face is found in the
/// submitted photo. Gets a dedicated user-facing message.
pub const NO_FACE_DETECTED: &str = "NoFaceDetectedError";

const TASK_KEY: &str = "prediction.task";
const CURRENT_KEY: &str = "prediction.current";

/// Successful classification reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    /// Matched celebrity class label, as returned by the service.
    pub class: String,
    /// Opaque filename token for the reference image.
    pub name: String,
}

impl PredictionResult {
    /// Location of the celebrity's reference image: the storage root
    /// plus a slug of the class (lower-cased, spaces to hyphens,
    /// periods removed) plus the filename token.
    pub fn image_url(&self, image_root: &Url) -> String {
        let slug = self.class.to_lowercase().replace(' ', "-").replace('.', "");
        format!("{image_root}{slug}/{}", self.name)
    }
}

/// What the render layer should show for the prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prediction {
    /// Submission in flight; render the spinner and schedule another
    /// pass.
    Pending,
    Done(PredictionResult),
    Failed(ApiError),
}

impl Prediction {
    fn from_outcome(outcome: Outcome<PredictionResult>) -> Self {
        match outcome {
            Ok(result) => Self::Done(result),
            Err(error) => Self::Failed(error),
        }
    }
}

/// Task handle tagged with the identity it was started for. The tag is
/// what lets a completion be dropped when the identity has moved on.
struct PendingPrediction {
    key: String,
    handle: TaskHandle<PredictionResult>,
}

pub struct PredictionJob;

impl PredictionJob {
    /// Session key for one (image content, model) identity.
    pub fn cache_key(image: &UploadedImage, model: Model) -> String {
        format!("prediction/{:016x}/{}", image.fingerprint(), model)
    }

    /// Drive the prediction for one render pass.
    ///
    /// Starts the submission task if the current identity has neither
    /// a cached outcome nor a task in flight. A pending task started
    /// for a previous identity is discarded here - it keeps running
    /// detached, and its late outcome is never written, because
    /// outcomes are only ever stored under the key the task itself was
    /// tagged with, after checking that key is still current.
    pub fn poll(
        state: &mut SessionState,
        api: &ApiClient,
        image: &UploadedImage,
        model: Model,
    ) -> Prediction {
        let key = Self::cache_key(image, model);

        // Identity change: invalidate everything keyed on the previous
        // identity before looking anything up.
        let previous = state.get::<String>(CURRENT_KEY).cloned();
        if previous.as_deref() != Some(key.as_str()) {
            if let Some(previous) = previous {
                debug!("prediction identity changed from '{}' to '{}'", previous, key);
                Memoizer::new(state).invalidate(&previous);
            }
            state.set(CURRENT_KEY, key.clone());
        }

        if let Some(outcome) = state.get::<Outcome<PredictionResult>>(&key) {
            return Prediction::from_outcome(outcome.clone());
        }

        let stale = state
            .get::<PendingPrediction>(TASK_KEY)
            .is_some_and(|pending| pending.key != key);
        if stale {
            debug!("dropping in-flight prediction task for a stale identity");
            state.remove(TASK_KEY);
        }

        if !state.contains(TASK_KEY) {
            info!("submitting prediction for '{}'", key);
            let client = api.clone();
            let upload = image.clone();
            let handle = TaskHandle::spawn(move || client.predict(&upload, model));
            state.set(
                TASK_KEY,
                PendingPrediction {
                    key: key.clone(),
                    handle,
                },
            );
        }

        let outcome = match state.get_mut::<PendingPrediction>(TASK_KEY) {
            Some(pending) if pending.key == key => pending.handle.try_join(),
            _ => None,
        };
        match outcome {
            Some(outcome) => {
                state.remove(TASK_KEY);
                let cached = Memoizer::new(state).invoke(&key, || outcome);
                Prediction::from_outcome(cached)
            }
            None => Prediction::Pending,
        }
    }

    /// Whether an outcome is memoized for this identity.
    pub fn is_done(state: &SessionState, image: &UploadedImage, model: Model) -> bool {
        state
            .get::<Outcome<PredictionResult>>(&Self::cache_key(image, model))
            .is_some()
    }

    /// Explicit invalidation: new upload, model switch, or the retry
    /// button. Drops the memoized outcome for the current identity and
    /// any pending task handle; an already-running task completes
    /// detached and its result is discarded.
    pub fn reset(state: &mut SessionState) {
        if let Some(previous) = state.get::<String>(CURRENT_KEY).cloned() {
            Memoizer::new(state).invalidate(&previous);
        }
        state.remove(CURRENT_KEY);
        state.remove(TASK_KEY);
    }
}

/// Select the user-facing message for a failed prediction. The three
/// failure classes stay distinguishable up to this point so each gets
/// its own template; the no-face domain code gets the friendlier one.
pub fn failure_message(error: &ApiError) -> String {
    match error {
        ApiError::Domain { code, .. } if code == NO_FACE_DETECTED => {
            "No face detected in the photo".to_string()
        }
        ApiError::Domain { code, message } => format!("{code}: {message}"),
        ApiError::Protocol { status, body } => {
            format!("The service returned HTTP {status}: {body}")
        }
        ApiError::Transport(message) => format!("A network error occurred: {message}"),
    }
}
