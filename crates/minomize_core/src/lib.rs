//! Minomize core: job model, job store, poll state machine, relay schema and
//! the pure page state machine. Nothing in here performs IO.
mod action;
mod effect;
mod error;
mod job;
mod msg;
mod poll;
mod state;
mod store;
mod update;
pub mod video;
mod view_model;

pub use action::{Action, ActionResponse, MALFORMED_ACTION, UNKNOWN_ACTION};
pub use effect::{Effect, ERROR_RESET_DELAY};
pub use error::{ApiError, ApiErrorKind};
pub use job::{JobId, JobRecord, JobStatus, StatusReport};
pub use msg::Msg;
pub use poll::{
    PollFailure, PollPolicy, PollSession, PollStep, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT,
};
pub use state::{PageState, DEFAULT_LABEL};
pub use store::{JobPersistence, JobStore, MemoryPersistence, StoreError, RETENTION_WINDOW};
pub use update::update;
pub use view_model::{
    ButtonState, ButtonView, JobRowView, RowAction, HISTORY_LIMIT, ROW_TITLE_CHARS,
};
