//! Doppel Client - HTTP layer for the celebrity-lookalike service
//!
//! Builds on `doppel-core` to give the render loop exactly three
//! entry points per pass: [`ReadinessProbe::poll`],
//! [`PredictionJob::poll`] and [`PredictionJob::reset`]. Each poll is
//! non-blocking (apart from the bounded warm-start wait of the probe),
//! so the UI stays interactive while the backend wakes up or thinks.

// Module declarations
pub mod api;
pub mod config;
pub mod predict;
pub mod probe;
pub mod upload;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::api::ApiClient;
    pub use crate::config::{ClientConfig, Model};
    pub use crate::predict::{failure_message, Prediction, PredictionJob, PredictionResult};
    pub use crate::probe::{Readiness, ReadinessProbe};
    pub use crate::upload::{UploadError, UploadedImage};
    pub use doppel_core::prelude::*;
}

// Re-export key types at the crate root
pub use api::ApiClient;
pub use config::{ClientConfig, Model};
pub use predict::{Prediction, PredictionJob, PredictionResult};
pub use probe::{Readiness, ReadinessProbe};
pub use upload::UploadedImage;
