use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use minomize_core::{ApiError, ApiErrorKind, JobId, StatusReport};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    /// Path segment of the start endpoint: `POST {base}/process/{source_kind}-url`.
    pub source_kind: String,
    /// JSON field carrying the submitted URL.
    pub source_field: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            source_kind: "youtube".to_string(),
            source_field: "youtubeUrl".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// The two calls the remote processing backend offers. Implementations never retry.
#[async_trait::async_trait]
pub trait ProcessingApi: Send + Sync {
    async fn start_job(&self, source_url: &str) -> Result<JobId, ApiError>;
    async fn get_status(&self, job_id: &str) -> Result<StatusReport, ApiError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartResponse {
    job_id: JobId,
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = Url::parse(settings.base_url.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                ApiError::new(
                    ApiErrorKind::InvalidInput,
                    format!("Invalid API base URL: {}", settings.base_url),
                )
            })?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| {
                engine_warn!("Failed to build http client: {}", err);
                ApiError::new(ApiErrorKind::Network, err.to_string())
            })?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Appends `segments` to the base path, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait::async_trait]
impl ProcessingApi for ReqwestApiClient {
    async fn start_job(&self, source_url: &str) -> Result<JobId, ApiError> {
        let kind_segment = format!("{}-url", self.settings.source_kind);
        let endpoint = self.endpoint(&["process", kind_segment.as_str()]);
        let mut payload = serde_json::Map::new();
        payload.insert(
            self.settings.source_field.clone(),
            serde_json::Value::String(source_url.to_string()),
        );
        let body = serde_json::Value::Object(payload).to_string();
        engine_info!("Starting job for {} via {}", source_url, endpoint);

        let response = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| {
                engine_warn!("Start request to {} failed: {}", endpoint, err);
                ApiError::start(ApiErrorKind::Network)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|err| {
            engine_warn!("Reading start response failed: {}", err);
            ApiError::start(ApiErrorKind::Network)
        })?;
        if !status.is_success() {
            engine_warn!("Backend rejected start: {} {}", status, text);
            return Err(ApiError::start(start_error_kind(status)));
        }

        let parsed: StartResponse = serde_json::from_str(&text).map_err(|err| {
            engine_warn!("Unexpected start response {:?}: {}", text, err);
            ApiError::start(ApiErrorKind::Server {
                status: status.as_u16(),
            })
        })?;
        engine_info!("Backend accepted {} as job {}", source_url, parsed.job_id);
        Ok(parsed.job_id)
    }

    async fn get_status(&self, job_id: &str) -> Result<StatusReport, ApiError> {
        let endpoint = self.endpoint(&["process", "status", job_id]);
        engine_debug!("Checking status of job {}", job_id);

        let response = self
            .client
            .get(endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| {
                engine_warn!("Status request for {} failed: {}", job_id, err);
                ApiError::status(ApiErrorKind::Network)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|err| {
            engine_warn!("Reading status response failed: {}", err);
            ApiError::status(ApiErrorKind::Network)
        })?;
        if !status.is_success() {
            engine_warn!("Status check for {} failed: {} {}", job_id, status, text);
            return Err(ApiError::status(status_error_kind(status)));
        }

        serde_json::from_str(&text).map_err(|err| {
            engine_warn!("Unexpected status payload {:?}: {}", text, err);
            ApiError::status(ApiErrorKind::Server {
                status: status.as_u16(),
            })
        })
    }
}

fn start_error_kind(status: StatusCode) -> ApiErrorKind {
    match status {
        StatusCode::CONFLICT => ApiErrorKind::Conflict,
        StatusCode::BAD_REQUEST => ApiErrorKind::InvalidInput,
        other => ApiErrorKind::Server {
            status: other.as_u16(),
        },
    }
}

fn status_error_kind(status: StatusCode) -> ApiErrorKind {
    match status {
        StatusCode::NOT_FOUND => ApiErrorKind::NotFound,
        other => ApiErrorKind::Server {
            status: other.as_u16(),
        },
    }
}
