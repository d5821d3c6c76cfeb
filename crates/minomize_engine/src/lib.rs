//! Minomize engine: remote API client, polling driver, background worker,
//! message relay and on-disk persistence.
mod api;
mod background;
mod persist;
mod poll;
mod relay;

pub use api::{ApiSettings, ProcessingApi, ReqwestApiClient};
pub use background::{BackgroundWorker, InstallReason, Notifier, TabOpener};
pub use persist::{ensure_data_dir, AtomicFileWriter, PersistError, RonJobFile, JOBS_FILENAME};
pub use poll::{poll_job, PollObserver, PollOutcome, StatusSource};
pub use relay::{RelayHandle, WORKER_UNAVAILABLE};
