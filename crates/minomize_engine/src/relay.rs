use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_warn};
use futures_util::FutureExt;
use minomize_core::{Action, ActionResponse, ApiError, ApiErrorKind, JobId, StatusReport};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::background::BackgroundWorker;
use crate::poll::StatusSource;

pub const WORKER_UNAVAILABLE: &str = "Background worker unavailable";

struct Envelope {
    request: Value,
    reply: oneshot::Sender<ActionResponse>,
}

/// Sending side of the relay, held by the page and popup contexts.
///
/// Messages cross the relay as JSON values only. Every request gets exactly one
/// response, and concurrent requests are handled independently in no particular order.
#[derive(Clone)]
pub struct RelayHandle {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl RelayHandle {
    /// Starts the background worker's receive loop on the current tokio runtime.
    /// The loop ends when the last handle is dropped.
    pub fn spawn(worker: Arc<BackgroundWorker>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();

        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let worker = worker.clone();
                tokio::spawn(async move {
                    let response = dispatch(worker.as_ref(), envelope.request).await;
                    if envelope.reply.send(response).is_err() {
                        engine_debug!("Relay caller went away before the response");
                    }
                });
            }
            engine_debug!("Relay closed; background loop exiting");
        });

        Self { tx }
    }

    pub async fn send(&self, action: &Action) -> ActionResponse {
        match serde_json::to_value(action) {
            Ok(request) => self.send_raw(request).await,
            Err(err) => {
                engine_error!("Failed to encode {} request: {}", action.kind(), err);
                ActionResponse::failure(minomize_core::MALFORMED_ACTION)
            }
        }
    }

    pub async fn send_raw(&self, request: Value) -> ActionResponse {
        let (reply, response) = oneshot::channel();
        if self.tx.send(Envelope { request, reply }).is_err() {
            engine_warn!("Relay is closed");
            return ActionResponse::failure(WORKER_UNAVAILABLE);
        }
        response
            .await
            .unwrap_or_else(|_| ActionResponse::failure(WORKER_UNAVAILABLE))
    }

    pub async fn start_processing(&self, video_url: &str) -> Result<JobId, ApiError> {
        let response = self
            .send(&Action::StartProcessing {
                video_url: video_url.to_string(),
            })
            .await;
        match response {
            ActionResponse {
                success: true,
                job_id: Some(job_id),
                ..
            } => Ok(job_id),
            ActionResponse { success: true, .. } => Err(ApiError::start(ApiErrorKind::Server {
                status: 200,
            })),
            failed => Err(failed.to_api_error()),
        }
    }

    pub async fn notify(&self, title: &str, message: &str, action_url: Option<String>) -> ActionResponse {
        self.send(&Action::ShowNotification {
            title: title.to_string(),
            message: message.to_string(),
            action_url,
        })
        .await
    }

    pub async fn open_tab(&self, url: &str) -> ActionResponse {
        self.send(&Action::OpenTab {
            url: url.to_string(),
        })
        .await
    }
}

#[async_trait::async_trait]
impl StatusSource for RelayHandle {
    async fn check_status(&self, job_id: &str) -> Result<StatusReport, ApiError> {
        let response = self
            .send(&Action::CheckStatus {
                job_id: job_id.to_string(),
            })
            .await;
        match response {
            ActionResponse {
                success: true,
                status: Some(report),
                ..
            } => Ok(report),
            ActionResponse { success: true, .. } => Err(ApiError::status(ApiErrorKind::Server {
                status: 200,
            })),
            failed => Err(failed.to_api_error()),
        }
    }
}

async fn dispatch(worker: &BackgroundWorker, request: Value) -> ActionResponse {
    let action = match Action::from_value(request) {
        Ok(action) => action,
        Err(rejection) => {
            engine_warn!("Rejected relay request: {}", rejection.error_message());
            return rejection;
        }
    };
    let kind = action.kind();

    // A panicking handler must not take the worker down with it.
    match AssertUnwindSafe(worker.handle(action)).catch_unwind().await {
        Ok(response) => response,
        Err(_) => {
            engine_error!("Handler for {} panicked", kind);
            ActionResponse::failure(format!("Internal error while handling {kind}"))
        }
    }
}
