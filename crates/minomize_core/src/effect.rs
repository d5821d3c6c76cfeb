use std::time::Duration;

/// How long an error label stays on the button before it resets.
pub const ERROR_RESET_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartProcessing { video_url: String },
    BeginPolling { job_id: crate::JobId },
    ShowNotification {
        title: String,
        message: String,
        action_url: Option<String>,
    },
    OpenTab { url: String },
    ScheduleReset { after: Duration },
}

impl Effect {
    pub(crate) fn notify(title: &str, message: impl Into<String>, action_url: Option<String>) -> Self {
        Effect::ShowNotification {
            title: title.to_string(),
            message: message.into(),
            action_url,
        }
    }
}
