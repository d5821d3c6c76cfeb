use crate::view_model::{ButtonState, ButtonView};
use crate::JobId;

pub const DEFAULT_LABEL: &str = "Minomize";

/// State of one video page: the trigger button and the job it started, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    frontend_base: String,
    video_url: Option<String>,
    active_job: Option<JobId>,
    result_url: Option<String>,
    button: ButtonState,
    label: String,
    dirty: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new("")
    }
}

impl PageState {
    pub fn new(frontend_base: impl Into<String>) -> Self {
        Self {
            frontend_base: frontend_base.into(),
            video_url: None,
            active_job: None,
            result_url: None,
            button: ButtonState::Default,
            label: DEFAULT_LABEL.to_string(),
            dirty: false,
        }
    }

    pub fn view(&self) -> ButtonView {
        ButtonView {
            visible: self.video_url.is_some(),
            enabled: self.button.is_enabled(),
            state: self.button,
            label: self.label.clone(),
            dirty: self.dirty,
        }
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    pub fn active_job(&self) -> Option<&str> {
        self.active_job.as_deref()
    }

    pub fn result_url(&self) -> Option<&str> {
        self.result_url.as_deref()
    }

    pub fn button(&self) -> ButtonState {
        self.button
    }

    pub(crate) fn frontend_base(&self) -> &str {
        &self.frontend_base
    }

    /// Returns whether a render is needed and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn load_page(&mut self, video_url: Option<String>, in_flight: bool) {
        self.video_url = video_url;
        self.active_job = None;
        self.result_url = None;
        if in_flight {
            self.set_button(ButtonState::Processing, "Processing...");
        } else {
            self.set_button(ButtonState::Default, DEFAULT_LABEL);
        }
    }

    pub(crate) fn set_button(&mut self, button: ButtonState, label: impl Into<String>) {
        self.button = button;
        self.label = label.into();
        self.dirty = true;
    }

    pub(crate) fn set_active_job(&mut self, job_id: Option<JobId>) {
        self.active_job = job_id;
    }

    pub(crate) fn set_result_url(&mut self, url: Option<String>) {
        self.result_url = url;
    }
}
