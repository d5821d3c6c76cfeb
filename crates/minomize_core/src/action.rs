//! Wire schema of the relay between the page/popup contexts and the background worker.
//!
//! Requests travel as JSON objects tagged by `action`; responses always carry
//! `success` and either a payload or an `error` string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, ApiErrorKind, JobId, StatusReport};

pub const UNKNOWN_ACTION: &str = "Unknown action";
pub const MALFORMED_ACTION: &str = "Malformed request";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    Ping,
    #[serde(rename_all = "camelCase")]
    StartProcessing { video_url: String },
    #[serde(rename_all = "camelCase")]
    CheckStatus { job_id: JobId },
    #[serde(rename_all = "camelCase")]
    ShowNotification {
        title: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        action_url: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    OpenTab { url: String },
}

impl Action {
    const KINDS: [&'static str; 5] = [
        "ping",
        "startProcessing",
        "checkStatus",
        "showNotification",
        "openTab",
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            Action::Ping => "ping",
            Action::StartProcessing { .. } => "startProcessing",
            Action::CheckStatus { .. } => "checkStatus",
            Action::ShowNotification { .. } => "showNotification",
            Action::OpenTab { .. } => "openTab",
        }
    }

    /// Decodes a raw relay message. Unknown or missing kinds and bad payloads
    /// come back as the failure response to send instead.
    pub fn from_value(value: Value) -> Result<Action, ActionResponse> {
        let known = value
            .get("action")
            .and_then(Value::as_str)
            .is_some_and(|kind| Self::KINDS.contains(&kind));
        if !known {
            return Err(ActionResponse::failure(UNKNOWN_ACTION));
        }
        serde_json::from_value(value).map_err(|_| ActionResponse::failure(MALFORMED_ACTION))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ApiErrorKind>,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn started(job_id: impl Into<JobId>) -> Self {
        Self {
            success: true,
            job_id: Some(job_id.into()),
            ..Self::default()
        }
    }

    pub fn status(report: StatusReport) -> Self {
        Self {
            success: true,
            status: Some(report),
            ..Self::default()
        }
    }

    pub fn pong() -> Self {
        Self {
            success: true,
            message: Some("pong".to_string()),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn from_api_error(err: &ApiError) -> Self {
        Self {
            success: false,
            error: Some(err.message.clone()),
            error_kind: Some(err.kind),
            ..Self::default()
        }
    }

    /// Error text of a failed response, with a fallback for responses that carry none.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("No response from background worker")
    }

    /// Rebuilds the API error carried by a failed response.
    /// Failures without a kind (relay-level problems) count as network errors.
    pub fn to_api_error(&self) -> ApiError {
        ApiError::new(
            self.error_kind.unwrap_or(ApiErrorKind::Network),
            self.error_message(),
        )
    }
}
