//! The popup: submit the current tab and keep a short, persisted job history.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use futures_util::future::join_all;
use minomize_core::video::{canonical_watch_url, display_title, is_video_page};
use minomize_core::{JobId, JobRecord, JobRowView, JobStore, MemoryPersistence, RowAction};
use minomize_engine::{RelayHandle, RonJobFile, StatusSource};

use crate::config::AppConfig;

pub const NOT_A_VIDEO: &str = "Visit a YouTube video to get started";
const FALLBACK_TITLE: &str = "YouTube Video";

pub struct Popup {
    relay: RelayHandle,
    store: JobStore<RonJobFile>,
    frontend_base: String,
    history_limit: usize,
}

impl Popup {
    /// Loads the persisted history, dropping jobs older than the retention window.
    pub fn open(relay: RelayHandle, config: &AppConfig, data_dir: &Path) -> anyhow::Result<Self> {
        let store = JobStore::load(RonJobFile::new(data_dir), Utc::now(), config.retention())
            .context("failed to load job history")?;
        Ok(Self {
            relay,
            store,
            frontend_base: config.frontend_base_url.clone(),
            history_limit: config.history_limit,
        })
    }

    pub async fn submit(&mut self, tab_url: &str, tab_title: Option<&str>) -> anyhow::Result<JobId> {
        if !is_video_page(tab_url) {
            bail!(NOT_A_VIDEO);
        }
        let title = display_title(tab_title, FALLBACK_TITLE);

        let job_id = self.relay.start_processing(tab_url).await?;
        let record = JobRecord::new(job_id.clone(), tab_url, Utc::now()).with_title(title);
        self.store
            .put(record)
            .context("failed to save job history")?;
        engine_info!("Submitted {} as job {}", tab_url, job_id);
        Ok(job_id)
    }

    /// Checks every running job once, concurrently. A failed check leaves the
    /// record as it was.
    pub async fn refresh(&mut self) {
        let pending = self.store.pending_ids();
        if pending.is_empty() {
            return;
        }
        let checks = pending.iter().map(|id| self.relay.check_status(id));
        let results = join_all(checks).await;

        for (job_id, result) in pending.iter().zip(results) {
            match result {
                Ok(report) => {
                    if let Err(err) = self.store.update_status(job_id, &report) {
                        engine_warn!("Failed to save status of {}: {}", job_id, err);
                    }
                }
                Err(err) => engine_warn!("Status check for {} failed: {}", job_id, err),
            }
        }
    }

    pub fn rows(&self) -> Vec<JobRowView> {
        self.store
            .list_recent(self.history_limit)
            .iter()
            .map(|record| JobRowView::from_record(record, &self.frontend_base))
            .collect()
    }

    /// Drops finished jobs once their final state has been shown.
    pub fn consume_finished(&mut self, shown: &[JobRowView]) {
        for row in shown.iter().filter(|row| row.status.is_terminal()) {
            if let Err(err) = self.store.remove(&row.job_id) {
                engine_warn!("Failed to drop finished job {}: {}", row.job_id, err);
            }
        }
    }

    /// Copies the running jobs into a fresh page store keyed by canonical video
    /// URL, so a page does not resubmit a video that is still being processed.
    pub fn running_page_store(&self) -> JobStore<MemoryPersistence> {
        let mut page = JobStore::in_memory();
        for job_id in self.store.pending_ids() {
            let Some(record) = self.store.get(&job_id) else {
                continue;
            };
            let mut record = record.clone();
            if let Some(url) = canonical_watch_url(&record.source_url) {
                record.source_url = url;
            }
            if let Err(err) = page.put(record) {
                engine_warn!("Failed to copy job {} to the page: {}", job_id, err);
            }
        }
        page
    }

    pub fn has_pending(&self) -> bool {
        !self.store.pending_ids().is_empty()
    }

    /// Refreshes, hands the rows to `show` and drops the finished ones. With
    /// `follow`, repeats at that interval until no job is running.
    /// Returns how many times the rows were shown.
    pub async fn show_history(
        &mut self,
        follow: Option<Duration>,
        mut show: impl FnMut(&[JobRowView]),
    ) -> usize {
        let mut shown = 0;
        loop {
            self.refresh().await;
            let rows = self.rows();
            show(&rows);
            shown += 1;
            self.consume_finished(&rows);

            let Some(interval) = follow.filter(|_| self.has_pending()) else {
                return shown;
            };
            tokio::time::sleep(interval).await;
        }
    }
}

pub fn print_rows(rows: &[JobRowView]) {
    if rows.is_empty() {
        println!("No recent jobs.");
        return;
    }
    for row in rows {
        let action = match &row.action {
            Some(RowAction::View { url }) => format!("  View: {url}"),
            Some(RowAction::Check) => "  (checking)".to_string(),
            None => String::new(),
        };
        println!(
            "{} {:<25} {:<12}{}",
            row.icon, row.title, row.status_text, action
        );
    }
}
