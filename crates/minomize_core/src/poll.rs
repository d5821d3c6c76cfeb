//! Job-status polling as a pure state machine.
//!
//! A [`PollSession`] is fed the elapsed time before every tick and the outcome
//! of every status request. It decides whether polling continues and guarantees
//! that exactly one terminal step is produced per session. The async driver
//! that sleeps and issues requests lives in the engine crate.

use std::time::Duration;

use thiserror::Error;

use crate::{ApiError, JobId, JobStatus, StatusReport};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed delay between ticks. The first request is issued one interval after start.
    pub interval: Duration,
    /// Polling gives up once the elapsed time exceeds this ceiling.
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// Why a poll cycle ended without a `complete` status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollFailure {
    /// The backend reported `error`.
    #[error("{}", .message.as_deref().unwrap_or("An error occurred during processing"))]
    Backend { message: Option<String> },
    /// The status request itself failed.
    #[error("{0}")]
    Api(ApiError),
    /// The polling ceiling was exceeded.
    #[error("Processing timeout")]
    Timeout,
}

impl PollFailure {
    /// Short message for button text and notifications.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Job still running; tick again after the interval.
    Continue(StatusReport),
    /// Terminal: the backend reported `complete`.
    Done(StatusReport),
    /// Terminal: backend error, request failure or timeout.
    Failed(PollFailure),
}

impl PollStep {
    /// Classifies one status outcome; `queued` counts as still running.
    pub fn from_outcome(outcome: Result<StatusReport, ApiError>) -> Self {
        match outcome {
            Ok(report) => match report.status {
                JobStatus::Queued | JobStatus::Processing => PollStep::Continue(report),
                JobStatus::Complete => PollStep::Done(report),
                JobStatus::Error => PollStep::Failed(PollFailure::Backend {
                    message: report.message,
                }),
            },
            Err(err) => PollStep::Failed(PollFailure::Api(err)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollStep::Continue(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSession {
    job_id: JobId,
    policy: PollPolicy,
    ticks: u32,
    finished: bool,
}

impl PollSession {
    pub fn new(job_id: impl Into<JobId>, policy: PollPolicy) -> Self {
        Self {
            job_id: job_id.into(),
            policy,
            ticks: 0,
            finished: false,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Number of status outcomes applied so far.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Called before each request. Returns the terminal timeout step once the
    /// ceiling is exceeded, in which case no request must be issued.
    pub fn check_deadline(&mut self, elapsed: Duration) -> Option<PollStep> {
        if self.finished {
            return None;
        }
        if elapsed > self.policy.timeout {
            self.finished = true;
            return Some(PollStep::Failed(PollFailure::Timeout));
        }
        None
    }

    /// Folds one status outcome into the session.
    ///
    /// Returns `None` if the session already produced its terminal step.
    pub fn apply(&mut self, outcome: Result<StatusReport, ApiError>) -> Option<PollStep> {
        if self.finished {
            return None;
        }
        Some(self.advance(outcome))
    }

    /// Like [`PollSession::apply`], for a driver that stops at the first terminal step.
    pub fn advance(&mut self, outcome: Result<StatusReport, ApiError>) -> PollStep {
        self.ticks += 1;
        let step = PollStep::from_outcome(outcome);
        self.finished |= step.is_terminal();
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_failure_without_message_uses_generic_text() {
        let failure = PollFailure::Backend { message: None };
        assert_eq!(failure.user_message(), "An error occurred during processing");
        let failure = PollFailure::Backend {
            message: Some("Transcription failed".into()),
        };
        assert_eq!(failure.user_message(), "Transcription failed");
    }
}
