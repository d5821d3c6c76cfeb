use std::time::Duration;

use minomize_core::{
    ApiError, ApiErrorKind, JobStatus, PollFailure, PollPolicy, PollSession, PollStep,
    StatusReport,
};
use pretty_assertions::assert_eq;

fn session() -> PollSession {
    PollSession::new("J1", PollPolicy::default())
}

#[test]
fn processing_and_queued_continue() {
    let mut session = session();
    let step = session.apply(Ok(StatusReport::processing(10))).unwrap();
    assert_eq!(step, PollStep::Continue(StatusReport::processing(10)));
    let step = session
        .apply(Ok(StatusReport::new(JobStatus::Queued)))
        .unwrap();
    assert!(!step.is_terminal());
    assert!(!session.is_finished());
    assert_eq!(session.ticks(), 2);
}

#[test]
fn complete_is_terminal_and_later_outcomes_are_ignored() {
    let mut session = session();
    let step = session
        .apply(Ok(StatusReport::new(JobStatus::Complete)))
        .unwrap();
    assert!(matches!(step, PollStep::Done(_)));
    assert!(session.is_finished());

    assert_eq!(session.apply(Ok(StatusReport::processing(99))), None);
    assert_eq!(session.check_deadline(Duration::from_secs(3600)), None);
    assert_eq!(session.ticks(), 1);
}

#[test]
fn backend_error_carries_message() {
    let mut session = session();
    let report = StatusReport::new(JobStatus::Error).with_message("Video is private");
    let step = session.apply(Ok(report)).unwrap();
    assert_eq!(
        step,
        PollStep::Failed(PollFailure::Backend {
            message: Some("Video is private".to_string())
        })
    );
}

#[test]
fn request_failures_end_the_session() {
    for kind in [
        ApiErrorKind::NotFound,
        ApiErrorKind::Network,
        ApiErrorKind::Server { status: 502 },
    ] {
        let mut session = session();
        let err = ApiError::status(kind);
        let step = session.apply(Err(err.clone())).unwrap();
        assert_eq!(step, PollStep::Failed(PollFailure::Api(err)));
        assert!(session.is_finished());
    }
}

#[test]
fn deadline_only_fires_after_ceiling_is_exceeded() {
    let mut session = session();
    assert_eq!(session.check_deadline(Duration::from_secs(600)), None);
    let step = session.check_deadline(Duration::from_secs(601));
    assert_eq!(step, Some(PollStep::Failed(PollFailure::Timeout)));
    // Exactly once.
    assert_eq!(session.check_deadline(Duration::from_secs(900)), None);
    assert_eq!(session.apply(Ok(StatusReport::processing(1))), None);
}

#[test]
fn timeout_message_is_user_facing() {
    assert_eq!(PollFailure::Timeout.user_message(), "Processing timeout");
    let api = PollFailure::Api(ApiError::status(ApiErrorKind::NotFound));
    assert_eq!(api.user_message(), "Processing job not found");
}

#[test]
fn advance_always_yields_a_step_and_tracks_the_end() {
    let mut session = session();
    assert_eq!(
        session.advance(Ok(StatusReport::processing(40))),
        PollStep::Continue(StatusReport::processing(40))
    );
    assert!(!session.is_finished());

    let err = ApiError::status(ApiErrorKind::NotFound);
    assert_eq!(
        session.advance(Err(err.clone())),
        PollStep::Failed(PollFailure::Api(err))
    );
    assert!(session.is_finished());
    assert_eq!(session.ticks(), 2);
    assert_eq!(session.apply(Ok(StatusReport::processing(50))), None);
}
