//! Blocking HTTP calls against the inference service
//!
//! Two endpoints exist: a readiness GET on the service root and the
//! prediction POST. Every response is classified into the `Outcome`
//! taxonomy here, so the layers above only ever see `ApiError`
//! variants, never raw `reqwest` errors.

use crate::config::{ClientConfig, Model};
use crate::predict::PredictionResult;
use crate::upload::UploadedImage;
use doppel_core::{ApiError, Outcome};
use reqwest::blocking::{multipart, Client};
use serde::Deserialize;
use tracing::{debug, info};

/// Client for the inference service. Cheap to clone; clones share the
/// underlying connection pool, so task threads can carry their own
/// copy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Build a client applying the configured request timeout.
    pub fn new(config: ClientConfig) -> Outcome<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::transport)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Readiness check: GET on the service root. Any 2xx with a JSON
    /// body means the service is up; the parsed body is kept for
    /// diagnostics.
    pub fn ping(&self) -> Outcome<serde_json::Value> {
        let url = self.config.service_root.clone();
        debug!("pinging service at {}", url);

        let response = self.http.get(url).send().map_err(ApiError::transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Protocol {
                status: status.as_u16(),
                body,
            });
        }
        response.json().map_err(ApiError::transport)
    }

    /// Submit the uploaded photo for classification.
    ///
    /// POST `{service_root}/predict-annoy/{model}` with a multipart
    /// field named `file` carrying the image bytes, original filename
    /// and MIME type.
    pub fn predict(&self, image: &UploadedImage, model: Model) -> Outcome<PredictionResult> {
        let url = self
            .config
            .service_root
            .join(&format!("predict-annoy/{}", model.as_str()))
            .map_err(ApiError::transport)?;

        let part = multipart::Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.mime_type())
            .map_err(ApiError::transport)?;
        let form = multipart::Form::new().part("file", part);

        info!(
            "submitting '{}' ({} bytes) to {}",
            image.file_name(),
            image.len(),
            url
        );
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .map_err(ApiError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Protocol {
                status: status.as_u16(),
                body,
            });
        }

        let reply: PredictReply = response.json().map_err(ApiError::transport)?;
        reply.into_outcome()
    }
}

/// Wire shape of the prediction response body. `status` discriminates
/// between the success fields and the error fields.
#[derive(Debug, Deserialize)]
struct PredictReply {
    status: String,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl PredictReply {
    fn into_outcome(self) -> Outcome<PredictionResult> {
        if self.status == "ok" {
            match (self.class, self.name) {
                (Some(class), Some(name)) => Ok(PredictionResult { class, name }),
                _ => Err(ApiError::Transport(
                    "malformed prediction reply: missing class or name".to_string(),
                )),
            }
        } else {
            Err(ApiError::Domain {
                code: self.error.unwrap_or_else(|| "UnknownError".to_string()),
                message: self.message.unwrap_or_default(),
            })
        }
    }
}
