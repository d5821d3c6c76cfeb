use engine_logging::{engine_debug, engine_info, engine_warn};
use minomize_core::{
    ApiError, JobPersistence, JobStore, PollFailure, PollPolicy, PollSession, PollStep,
    StatusReport,
};
use tokio::time::Instant;

use crate::api::{ProcessingApi, ReqwestApiClient};

/// Anything that can answer a status check: the API client itself, or the relay.
#[async_trait::async_trait]
pub trait StatusSource: Send + Sync {
    async fn check_status(&self, job_id: &str) -> Result<StatusReport, ApiError>;
}

#[async_trait::async_trait]
impl StatusSource for ReqwestApiClient {
    async fn check_status(&self, job_id: &str) -> Result<StatusReport, ApiError> {
        self.get_status(job_id).await
    }
}

/// Callbacks fired by [`poll_job`]. Exactly one of `on_done`/`on_failed` fires per cycle.
pub trait PollObserver {
    fn on_progress(&mut self, job_id: &str, report: &StatusReport);
    fn on_done(&mut self, job_id: &str, report: &StatusReport);
    fn on_failed(&mut self, job_id: &str, failure: &PollFailure);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed(StatusReport),
    Failed(PollFailure),
}

/// Polls `job_id` at a fixed interval until it completes, fails or times out.
///
/// Each running report overwrites the record in `store`; the record is removed
/// once the cycle ends. There is no cancel: dropping the future abandons the cycle.
pub async fn poll_job<S, P>(
    source: &S,
    policy: PollPolicy,
    job_id: &str,
    store: &mut JobStore<P>,
    observer: &mut dyn PollObserver,
) -> PollOutcome
where
    S: StatusSource + ?Sized,
    P: JobPersistence,
{
    let started = Instant::now();
    let mut session = PollSession::new(job_id, policy);
    engine_info!(
        "Polling job {} every {:?} (timeout {:?})",
        job_id,
        policy.interval,
        policy.timeout
    );

    loop {
        tokio::time::sleep(policy.interval).await;

        let step = match session.check_deadline(started.elapsed()) {
            Some(timeout) => timeout,
            None => {
                let outcome = source.check_status(job_id).await;
                session.advance(outcome)
            }
        };

        match step {
            PollStep::Continue(report) => {
                engine_debug!(
                    "Job {} still {} ({:?}%)",
                    job_id,
                    report.status,
                    report.progress
                );
                if let Err(err) = store.update_status(job_id, &report) {
                    engine_warn!("Failed to store status of job {}: {}", job_id, err);
                }
                observer.on_progress(job_id, &report);
            }
            PollStep::Done(report) => {
                engine_info!("Job {} complete after {} checks", job_id, session.ticks());
                forget(store, job_id);
                observer.on_done(job_id, &report);
                return PollOutcome::Completed(report);
            }
            PollStep::Failed(failure) => {
                engine_warn!("Job {} failed: {}", job_id, failure);
                forget(store, job_id);
                observer.on_failed(job_id, &failure);
                return PollOutcome::Failed(failure);
            }
        }
    }
}

fn forget<P: JobPersistence>(store: &mut JobStore<P>, job_id: &str) {
    if let Err(err) = store.remove(job_id) {
        engine_warn!("Failed to remove job {} from store: {}", job_id, err);
    }
}
