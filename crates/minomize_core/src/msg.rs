#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A page finished loading (or the SPA navigated).
    PageLoaded {
        page_url: String,
        /// The page store already holds a job for this video.
        in_flight: bool,
    },
    /// User clicked the trigger button.
    TriggerClicked,
    /// The background worker accepted the start request.
    StartSucceeded { job_id: crate::JobId },
    /// The start request failed; `error` is the user-facing text.
    StartFailed { error: String },
    /// A poll tick reported the job still running.
    StatusUpdated(crate::StatusReport),
    /// The job reached `complete`.
    JobCompleted,
    /// The poll cycle ended in failure.
    JobFailed { failure: crate::PollFailure },
    /// The error display delay elapsed.
    ResetElapsed,
}
