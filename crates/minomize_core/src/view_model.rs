use crate::video::{result_url, truncate_text};
use crate::{JobId, JobRecord, JobStatus};

/// Rows shown in the popup history.
pub const HISTORY_LIMIT: usize = 5;
/// Characters of a job title shown in a history row.
pub const ROW_TITLE_CHARS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Default,
    Loading,
    Processing,
    Completed,
    Error,
}

impl ButtonState {
    /// Loading and processing buttons ignore clicks.
    pub fn is_enabled(self) -> bool {
        !matches!(self, ButtonState::Loading | ButtonState::Processing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ButtonView {
    pub visible: bool,
    pub enabled: bool,
    pub state: ButtonState,
    pub label: String,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    View { url: String },
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub title: String,
    pub status: JobStatus,
    pub icon: &'static str,
    pub status_text: String,
    pub action: Option<RowAction>,
}

impl JobRowView {
    pub fn from_record(record: &JobRecord, frontend_base: &str) -> Self {
        let title = record.title.as_deref().unwrap_or("YouTube Video");
        let action = match record.status {
            JobStatus::Complete => Some(RowAction::View {
                url: result_url(frontend_base, &record.id),
            }),
            JobStatus::Queued | JobStatus::Processing => Some(RowAction::Check),
            JobStatus::Error => None,
        };
        Self {
            job_id: record.id.clone(),
            title: truncate_text(title, ROW_TITLE_CHARS),
            status: record.status,
            icon: status_icon(record.status),
            status_text: status_text(record),
            action,
        }
    }
}

fn status_icon(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Queued => "⏳",
        JobStatus::Processing => "🔄",
        JobStatus::Complete => "✅",
        JobStatus::Error => "❌",
    }
}

fn status_text(record: &JobRecord) -> String {
    match record.status {
        JobStatus::Queued => record.message.clone().unwrap_or_else(|| "Queued".to_string()),
        JobStatus::Processing => record
            .message
            .clone()
            .unwrap_or_else(|| format!("{}%", record.progress.unwrap_or(0))),
        JobStatus::Complete => "Ready".to_string(),
        JobStatus::Error => "Failed".to_string(),
    }
}
