use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use engine_logging::{engine_debug, engine_info, engine_warn};
use minomize_core::{Action, ActionResponse};

use crate::api::ProcessingApi;

/// Surface for user-visible system notifications.
///
/// Interactive surfaces report clicks and dismissals back through
/// [`BackgroundWorker::notification_clicked`] and
/// [`BackgroundWorker::notification_closed`].
pub trait Notifier: Send + Sync {
    fn show(&self, notification_id: &str, title: &str, message: &str, action_url: Option<&str>);
    fn clear(&self, notification_id: &str);

    /// False for surfaces that cannot be clicked; their follow-up URLs are not kept.
    fn is_interactive(&self) -> bool {
        true
    }
}

/// Opens a URL in a new browsing context.
pub trait TabOpener: Send + Sync {
    fn open(&self, url: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    Install,
    Update,
}

/// The context that owns network access. Stateless per request apart from
/// the follow-up URLs of notifications that are still on screen.
pub struct BackgroundWorker {
    api: Arc<dyn ProcessingApi>,
    notifier: Arc<dyn Notifier>,
    opener: Arc<dyn TabOpener>,
    follow_ups: Mutex<HashMap<String, String>>,
    next_notification: AtomicU64,
}

impl BackgroundWorker {
    pub fn new(
        api: Arc<dyn ProcessingApi>,
        notifier: Arc<dyn Notifier>,
        opener: Arc<dyn TabOpener>,
    ) -> Self {
        Self {
            api,
            notifier,
            opener,
            follow_ups: Mutex::new(HashMap::new()),
            next_notification: AtomicU64::new(1),
        }
    }

    pub async fn handle(&self, action: Action) -> ActionResponse {
        engine_debug!("Background received {}", action.kind());
        match action {
            Action::Ping => ActionResponse::pong(),
            Action::StartProcessing { video_url } => match self.api.start_job(&video_url).await {
                Ok(job_id) => ActionResponse::started(job_id),
                Err(err) => ActionResponse::from_api_error(&err),
            },
            Action::CheckStatus { job_id } => match self.api.get_status(&job_id).await {
                Ok(report) => ActionResponse::status(report),
                Err(err) => ActionResponse::from_api_error(&err),
            },
            Action::ShowNotification {
                title,
                message,
                action_url,
            } => {
                self.show_notification(&title, &message, action_url);
                ActionResponse::ok()
            }
            Action::OpenTab { url } => {
                self.open_tab(&url);
                ActionResponse::ok()
            }
        }
    }

    /// Shows a notification and remembers its follow-up URL. Returns the notification id.
    pub fn show_notification(&self, title: &str, message: &str, action_url: Option<String>) -> String {
        let id = format!(
            "minomize-{}",
            self.next_notification.fetch_add(1, Ordering::Relaxed)
        );
        self.notifier.show(&id, title, message, action_url.as_deref());
        if let Some(url) = action_url.filter(|_| self.notifier.is_interactive()) {
            if let Ok(mut follow_ups) = self.follow_ups.lock() {
                follow_ups.insert(id.clone(), url);
            }
        }
        engine_info!("Notification {} shown: {}", id, title);
        id
    }

    pub fn open_tab(&self, url: &str) {
        engine_info!("Opening {}", url);
        self.opener.open(url);
    }

    /// Opens the notification's follow-up URL, if any, then clears it.
    pub fn notification_clicked(&self, notification_id: &str) {
        if let Some(url) = self.take_follow_up(notification_id) {
            self.open_tab(&url);
        }
        self.notifier.clear(notification_id);
    }

    /// The user dismissed the notification without clicking it.
    pub fn notification_closed(&self, notification_id: &str) {
        if self.take_follow_up(notification_id).is_some() {
            engine_debug!("Dropped follow-up of notification {}", notification_id);
        }
    }

    pub fn on_installed(&self, reason: InstallReason) {
        match reason {
            InstallReason::Install => {
                engine_info!("Extension installed for the first time");
                self.show_notification(
                    "Minomize Extension Installed!",
                    "Visit any YouTube video and click the Minomize button to get started.",
                    None,
                );
            }
            InstallReason::Update => engine_info!("Extension updated"),
        }
    }

    /// Follow-up URLs of notifications still on screen.
    pub fn pending_follow_ups(&self) -> usize {
        self.follow_ups.lock().map(|map| map.len()).unwrap_or(0)
    }

    fn take_follow_up(&self, notification_id: &str) -> Option<String> {
        match self.follow_ups.lock() {
            Ok(mut follow_ups) => follow_ups.remove(notification_id),
            Err(err) => {
                engine_warn!("Follow-up map poisoned: {}", err);
                None
            }
        }
    }
}
