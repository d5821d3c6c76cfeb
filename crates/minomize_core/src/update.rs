use crate::effect::ERROR_RESET_DELAY;
use crate::state::DEFAULT_LABEL;
use crate::video::{canonical_watch_url, result_url};
use crate::view_model::ButtonState;
use crate::{Effect, Msg, PageState, PollFailure};

/// Pure update function: applies a message to the page state and returns any effects.
pub fn update(mut state: PageState, msg: Msg) -> (PageState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageLoaded {
            page_url,
            in_flight,
        } => {
            state.load_page(canonical_watch_url(&page_url), in_flight);
            Vec::new()
        }
        Msg::TriggerClicked => trigger_clicked(&mut state),
        Msg::StartSucceeded { job_id } => {
            // A late answer for a page that has since navigated away is dropped.
            if state.button() != ButtonState::Loading {
                return (state, Vec::new());
            }
            state.set_button(ButtonState::Processing, "Processing...");
            state.set_active_job(Some(job_id.clone()));
            // Polling runs for the life of the job; the notification goes out first.
            vec![
                Effect::notify(
                    "Processing started!",
                    "Your video is being processed by Minomize.",
                    None,
                ),
                Effect::BeginPolling { job_id },
            ]
        }
        Msg::StartFailed { error } => {
            if state.button() != ButtonState::Loading {
                return (state, Vec::new());
            }
            state.set_button(ButtonState::Error, "Error");
            vec![
                Effect::notify("Error", error, None),
                Effect::ScheduleReset {
                    after: ERROR_RESET_DELAY,
                },
            ]
        }
        Msg::StatusUpdated(report) => {
            if state.active_job().is_none() {
                return (state, Vec::new());
            }
            let label = report
                .message
                .clone()
                .unwrap_or_else(|| format!("Processing... {}%", report.progress.unwrap_or(0)));
            state.set_button(ButtonState::Processing, label);
            Vec::new()
        }
        Msg::JobCompleted => {
            let Some(job_id) = state.active_job().map(ToOwned::to_owned) else {
                return (state, Vec::new());
            };
            let url = result_url(state.frontend_base(), &job_id);
            state.set_active_job(None);
            state.set_result_url(Some(url.clone()));
            state.set_button(ButtonState::Completed, "View Results");
            vec![Effect::notify(
                "Video processed!",
                "Your Minomized video is ready. Click to view.",
                Some(url),
            )]
        }
        Msg::JobFailed { failure } => {
            if state.active_job().is_none() {
                return (state, Vec::new());
            }
            state.set_active_job(None);
            job_failed(&mut state, failure)
        }
        Msg::ResetElapsed => {
            if state.button() == ButtonState::Error {
                state.set_button(ButtonState::Default, DEFAULT_LABEL);
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn trigger_clicked(state: &mut PageState) -> Vec<Effect> {
    match state.button() {
        ButtonState::Loading | ButtonState::Processing => Vec::new(),
        ButtonState::Completed => match state.result_url() {
            Some(url) => vec![Effect::OpenTab {
                url: url.to_string(),
            }],
            None => Vec::new(),
        },
        ButtonState::Default | ButtonState::Error => {
            let Some(video_url) = state.video_url().map(ToOwned::to_owned) else {
                return Vec::new();
            };
            state.set_result_url(None);
            state.set_button(ButtonState::Loading, "Starting...");
            vec![Effect::StartProcessing { video_url }]
        }
    }
}

fn job_failed(state: &mut PageState, failure: PollFailure) -> Vec<Effect> {
    let reset = Effect::ScheduleReset {
        after: ERROR_RESET_DELAY,
    };
    match failure {
        // The backend said so: tell the user why.
        PollFailure::Backend { .. } => {
            state.set_button(ButtonState::Error, "Failed");
            vec![
                Effect::notify("Processing failed", failure.user_message(), None),
                reset,
            ]
        }
        PollFailure::Api(_) | PollFailure::Timeout => {
            state.set_button(ButtonState::Error, "Error");
            vec![reset]
        }
    }
}
