use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure categories of the remote processing API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiErrorKind {
    /// HTTP 400, the submitted URL was rejected.
    InvalidInput,
    /// HTTP 409, the video is already queued.
    Conflict,
    /// HTTP 404, unknown job id.
    NotFound,
    /// Transport or connection failure.
    Network,
    /// Any other non-2xx status, or a 2xx body that could not be parsed.
    Server { status: u16 },
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::InvalidInput => write!(f, "invalid input"),
            ApiErrorKind::Conflict => write!(f, "conflict"),
            ApiErrorKind::NotFound => write!(f, "not found"),
            ApiErrorKind::Network => write!(f, "network error"),
            ApiErrorKind::Server { status } => write!(f, "server error (http {status})"),
        }
    }
}

/// An API failure carrying the short message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Error for a failed `startJob` call, with the message the trigger button shows.
    pub fn start(kind: ApiErrorKind) -> Self {
        let message = match kind {
            ApiErrorKind::Conflict => "This video is already being processed. Please wait.",
            ApiErrorKind::InvalidInput => "Invalid YouTube URL provided.",
            ApiErrorKind::Network => "Network error. Please check your connection and try again.",
            ApiErrorKind::NotFound | ApiErrorKind::Server { .. } => "Failed to start processing",
        };
        Self::new(kind, message)
    }

    /// Error for a failed `getStatus` call.
    pub fn status(kind: ApiErrorKind) -> Self {
        let message = match kind {
            ApiErrorKind::NotFound => "Processing job not found",
            ApiErrorKind::Network => "Network error while checking status",
            ApiErrorKind::InvalidInput | ApiErrorKind::Conflict | ApiErrorKind::Server { .. } => {
                "Failed to check processing status"
            }
        };
        Self::new(kind, message)
    }
}
