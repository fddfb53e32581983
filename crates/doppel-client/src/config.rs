//! Configuration for the Doppel client

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Root URL of the production inference service.
pub const DEFAULT_SERVICE_ROOT: &str =
    "https://celebtwin-api-244684580447.europe-west4.run.app/";

/// Public storage root holding the celebrity reference images.
pub const DEFAULT_IMAGE_ROOT: &str =
    "https://storage.googleapis.com/celebtwin/public/img/";

/// Main configuration for the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root URL of the inference service
    pub service_root: Url,

    /// Storage root for derived celebrity image URLs
    pub image_root: Url,

    /// Per-request timeout applied by the HTTP client
    pub request_timeout: Duration,

    /// Ceiling on the synchronous wait right after starting the
    /// readiness probe. Keeps an already-warm service from flashing a
    /// "starting" state for one render pass; purely a latency knob.
    pub warm_wait: Duration,

    /// Model variant selected when the user has not picked one
    pub default_model: Model,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_root: Url::parse(DEFAULT_SERVICE_ROOT)
                .expect("default service root is a valid URL"),
            image_root: Url::parse(DEFAULT_IMAGE_ROOT)
                .expect("default image root is a valid URL"),
            request_timeout: Duration::from_secs(30),
            warm_wait: Duration::from_millis(50),
            default_model: Model::VggFace,
        }
    }
}

/// Model variants offered by the inference service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    Facenet,
    VggFace,
}

impl Model {
    /// Identifier used in the submission URL path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facenet => "facenet",
            Self::VggFace => "vggface",
        }
    }

    /// Human-readable label for a model picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Facenet => "v1 - Facenet",
            Self::VggFace => "v2 - VGG-Face",
        }
    }

    /// All selectable variants, picker order.
    pub fn all() -> [Model; 2] {
        [Self::Facenet, Self::VggFace]
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::VggFace
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_well_formed() {
        let config = ClientConfig::default();
        assert!(config.service_root.as_str().ends_with('/'));
        assert!(config.image_root.as_str().ends_with('/'));
        assert!(config.warm_wait < Duration::from_secs(1));
        assert_eq!(config.default_model, Model::VggFace);
    }

    #[test]
    fn model_ids_match_the_service_paths() {
        assert_eq!(Model::Facenet.as_str(), "facenet");
        assert_eq!(Model::VggFace.as_str(), "vggface");
    }

    #[test]
    fn model_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Model::VggFace).unwrap(), "\"vggface\"");
        let parsed: Model = serde_json::from_str("\"facenet\"").unwrap();
        assert_eq!(parsed, Model::Facenet);
    }
}
