use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{JobId, JobRecord, StatusReport};

/// Records older than this are swept the next time a store is loaded.
pub const RETENTION_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode job list: {0}")]
    Encode(String),
    #[error("failed to decode job list: {0}")]
    Decode(String),
    #[error("job list unavailable: {0}")]
    Unavailable(String),
}

/// Backing storage for a [`JobStore`]. The whole list is read and written at once.
pub trait JobPersistence {
    fn load(&self) -> Result<Vec<JobRecord>, StoreError>;
    fn save(&self, records: &[JobRecord]) -> Result<(), StoreError>;
}

/// Non-durable persistence, used by the page context whose store dies with the page.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    records: Arc<Mutex<Vec<JobRecord>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last list written through this backend.
    pub fn snapshot(&self) -> Vec<JobRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl JobPersistence for MemoryPersistence {
    fn load(&self) -> Result<Vec<JobRecord>, StoreError> {
        self.records
            .lock()
            .map(|records| records.clone())
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }

    fn save(&self, records: &[JobRecord]) -> Result<(), StoreError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        *guard = records.to_vec();
        Ok(())
    }
}

/// Job records keyed by id, newest first, written through to `P` on every change.
#[derive(Debug)]
pub struct JobStore<P> {
    records: Vec<JobRecord>,
    persistence: P,
}

impl JobStore<MemoryPersistence> {
    pub fn in_memory() -> Self {
        Self {
            records: Vec::new(),
            persistence: MemoryPersistence::new(),
        }
    }
}

impl<P: JobPersistence> JobStore<P> {
    /// Loads the persisted list and sweeps records past `max_age` once.
    pub fn load(persistence: P, now: DateTime<Utc>, max_age: Duration) -> Result<Self, StoreError> {
        let mut loaded = persistence.load()?;
        // Duplicate ids in a hand-edited file: first (newest) wins.
        let mut seen = std::collections::HashSet::new();
        loaded.retain(|record| seen.insert(record.id.clone()));

        let mut store = Self {
            records: loaded,
            persistence,
        };
        if store.prune(max_age, now) > 0 {
            store.persist()?;
        }
        Ok(store)
    }

    /// Inserts a new record at the front, or replaces the record with the same id in place.
    pub fn put(&mut self, record: JobRecord) -> Result<(), StoreError> {
        match self.records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.insert(0, record),
        }
        self.persist()
    }

    pub fn get(&self, id: &str) -> Option<&JobRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// True if some record was created for `source_url` and is still in the store.
    pub fn has_source(&self, source_url: &str) -> bool {
        self.records
            .iter()
            .any(|record| record.source_url == source_url)
    }

    pub fn remove(&mut self, id: &str) -> Result<Option<JobRecord>, StoreError> {
        let Some(index) = self.records.iter().position(|record| record.id == id) else {
            return Ok(None);
        };
        let removed = self.records.remove(index);
        self.persist()?;
        Ok(Some(removed))
    }

    /// Overwrites status, progress and message of an existing record. Unknown ids are ignored.
    pub fn update_status(&mut self, id: &str, report: &StatusReport) -> Result<bool, StoreError> {
        let Some(record) = self.records.iter_mut().find(|record| record.id == id) else {
            return Ok(false);
        };
        record.apply_report(report);
        self.persist()?;
        Ok(true)
    }

    /// Up to `limit` records, most recently created first.
    pub fn list_recent(&self, limit: usize) -> Vec<JobRecord> {
        let mut sorted: Vec<&JobRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        sorted.into_iter().take(limit).cloned().collect()
    }

    /// Ids of records that still need status checks.
    pub fn pending_ids(&self) -> Vec<JobId> {
        self.records
            .iter()
            .filter(|record| !record.status.is_terminal())
            .map(|record| record.id.clone())
            .collect()
    }

    /// Drops records whose start time is not newer than `now - max_age`.
    /// Returns how many were removed. Does not write through; [`JobStore::load`] does.
    pub fn prune(&mut self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let cutoff = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| now.checked_sub_signed(age));
        let Some(cutoff) = cutoff else {
            return 0;
        };
        let before = self.records.len();
        self.records.retain(|record| record.started_at > cutoff);
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.persistence.save(&self.records)
    }
}
