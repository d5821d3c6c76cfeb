use std::collections::VecDeque;

use chrono::Utc;
use engine_logging::{engine_debug, engine_info, engine_warn};
use minomize_core::video::canonical_watch_url;
use minomize_core::{
    update, ButtonState, ButtonView, Effect, JobId, JobRecord, JobStore, MemoryPersistence, Msg,
    PageState, PollFailure, PollPolicy, StatusReport,
};
use minomize_engine::{poll_job, PollObserver, RelayHandle};

/// Draws the trigger button whenever its view changes.
pub type Renderer = Box<dyn FnMut(&ButtonView) + Send>;

pub fn print_button(view: &ButtonView) {
    if !view.visible {
        return;
    }
    let marker = if view.enabled { " " } else { "·" };
    println!("[{marker}{}]", view.label);
}

/// Drives one video page: feeds messages through `update` and executes the
/// effects it returns against the relay.
///
/// Polling outlives everything else a message triggers, so `BeginPolling` is
/// deferred until the rest of the batch and every queued message have run.
pub struct EffectRunner {
    relay: RelayHandle,
    policy: PollPolicy,
    state: PageState,
    store: JobStore<MemoryPersistence>,
    queue: VecDeque<Msg>,
    polls: VecDeque<JobId>,
    renderer: Renderer,
    open_results: bool,
}

impl EffectRunner {
    pub fn new(
        relay: RelayHandle,
        policy: PollPolicy,
        frontend_base: &str,
        open_results: bool,
    ) -> Self {
        Self {
            relay,
            policy,
            state: PageState::new(frontend_base),
            store: JobStore::in_memory(),
            queue: VecDeque::new(),
            polls: VecDeque::new(),
            renderer: Box::new(print_button),
            open_results,
        }
    }

    /// Starts from jobs already known to be running, e.g. ones submitted elsewhere.
    pub fn with_page_store(mut self, store: JobStore<MemoryPersistence>) -> Self {
        self.store = store;
        self
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Loads `page_url`, clicks the trigger and runs until no work is left.
    /// Returns the final button state.
    pub async fn run(mut self, page_url: &str) -> ButtonState {
        let in_flight = canonical_watch_url(page_url)
            .map(|url| self.store.has_source(&url))
            .unwrap_or(false);
        self.dispatch(Msg::PageLoaded {
            page_url: page_url.to_string(),
            in_flight,
        })
        .await;

        if !self.state.view().visible {
            engine_info!("{} is not a video page; nothing to do", page_url);
            return self.state.button();
        }
        if in_flight {
            engine_info!("A job for {} is already running", page_url);
            return self.state.button();
        }

        self.dispatch(Msg::TriggerClicked).await;
        if self.open_results && self.state.button() == ButtonState::Completed {
            self.dispatch(Msg::TriggerClicked).await;
        }
        self.state.button()
    }

    async fn dispatch(&mut self, msg: Msg) {
        self.queue.push_back(msg);
        loop {
            while let Some(msg) = self.queue.pop_front() {
                let effects = apply(&mut self.state, msg);
                self.render();
                for effect in effects {
                    self.execute(effect).await;
                }
            }
            let Some(job_id) = self.polls.pop_front() else {
                break;
            };
            self.poll(&job_id).await;
        }
    }

    async fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::StartProcessing { video_url } => {
                match self.relay.start_processing(&video_url).await {
                    Ok(job_id) => {
                        let record = JobRecord::new(job_id.clone(), video_url, Utc::now());
                        if let Err(err) = self.store.put(record) {
                            engine_warn!("Failed to record job {}: {}", job_id, err);
                        }
                        self.queue.push_back(Msg::StartSucceeded { job_id });
                    }
                    Err(err) => {
                        engine_warn!("Start failed: {}", err);
                        self.queue.push_back(Msg::StartFailed {
                            error: err.message,
                        });
                    }
                }
            }
            Effect::BeginPolling { job_id } => self.polls.push_back(job_id),
            Effect::ShowNotification {
                title,
                message,
                action_url,
            } => {
                let response = self.relay.notify(&title, &message, action_url).await;
                if !response.success {
                    engine_warn!("Notification failed: {}", response.error_message());
                }
            }
            Effect::OpenTab { url } => {
                let response = self.relay.open_tab(&url).await;
                if !response.success {
                    engine_warn!("Opening {} failed: {}", url, response.error_message());
                }
            }
            Effect::ScheduleReset { after } => {
                tokio::time::sleep(after).await;
                self.queue.push_back(Msg::ResetElapsed);
            }
        }
    }

    async fn poll(&mut self, job_id: &str) {
        let Self {
            relay,
            policy,
            state,
            store,
            queue,
            renderer,
            ..
        } = self;
        let mut observer = PageObserver {
            state,
            queue,
            renderer,
        };
        poll_job(&*relay, *policy, job_id, store, &mut observer).await;
    }

    fn render(&mut self) {
        if self.state.consume_dirty() {
            (self.renderer)(&self.state.view());
        }
    }
}

/// Renders progress as soon as it arrives and queues the terminal message.
struct PageObserver<'a> {
    state: &'a mut PageState,
    queue: &'a mut VecDeque<Msg>,
    renderer: &'a mut Renderer,
}

impl PollObserver for PageObserver<'_> {
    fn on_progress(&mut self, _job_id: &str, report: &StatusReport) {
        apply(self.state, Msg::StatusUpdated(report.clone()));
        if self.state.consume_dirty() {
            (self.renderer)(&self.state.view());
        }
    }

    fn on_done(&mut self, job_id: &str, _report: &StatusReport) {
        engine_debug!("Job {} done", job_id);
        self.queue.push_back(Msg::JobCompleted);
    }

    fn on_failed(&mut self, _job_id: &str, failure: &PollFailure) {
        self.queue.push_back(Msg::JobFailed {
            failure: failure.clone(),
        });
    }
}

fn apply(state: &mut PageState, msg: Msg) -> Vec<Effect> {
    let (next, effects) = update(std::mem::take(state), msg);
    *state = next;
    effects
}
