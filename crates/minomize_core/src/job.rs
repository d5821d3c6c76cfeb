use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Opaque job identifier issued by the remote API.
pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Complete,
    Error,
}

impl JobStatus {
    /// `complete` and `error` end a poll cycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Complete => write!(f, "complete"),
            JobStatus::Error => write!(f, "error"),
        }
    }
}

/// Payload of `GET /process/status/{jobId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: JobStatus,
    /// Percent complete. Any JSON number (or numeric string) is accepted,
    /// rounded and clamped to 0..=100.
    #[serde(
        default,
        deserialize_with = "lenient_progress",
        skip_serializing_if = "Option::is_none"
    )]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusReport {
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            progress: None,
            message: None,
        }
    }

    pub fn processing(progress: u8) -> Self {
        Self {
            status: JobStatus::Processing,
            progress: Some(progress.min(100)),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

fn lenient_progress<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(progress_percent))
}

fn progress_percent(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    Some(number.round().clamp(0.0, 100.0) as u8)
}

/// One processing request as remembered by a page or popup context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: JobId,
    pub source_url: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "startTime")]
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl JobRecord {
    pub fn new(id: impl Into<JobId>, source_url: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            source_url: source_url.into(),
            status: JobStatus::Queued,
            progress: None,
            message: None,
            started_at,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Overwrites the mutable fields wholesale; there is no partial merge.
    pub fn apply_report(&mut self, report: &StatusReport) {
        self.status = report.status;
        self.progress = report.progress;
        self.message = report.message.clone();
    }
}
