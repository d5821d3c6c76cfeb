use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};
use minomize_core::{JobPersistence, JobRecord, StoreError};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const JOBS_FILENAME: &str = "recent_jobs.ron";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("data directory missing or not writable: {0}")]
    DataDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<PersistError> for StoreError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::Io(io) => StoreError::Io(io),
            PersistError::DataDir(reason) => StoreError::Unavailable(reason),
        }
    }
}

/// Ensure the data directory exists; create if missing.
pub fn ensure_data_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::DataDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::DataDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::DataDir(e.to_string()))?;
    }
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_data_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // `persist` replaces an existing target.
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedJobs {
    recent_jobs: Vec<JobRecord>,
}

/// The popup's job list, kept as a RON file under a single key.
#[derive(Debug, Clone)]
pub struct RonJobFile {
    dir: PathBuf,
}

impl RonJobFile {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(JOBS_FILENAME)
    }
}

impl JobPersistence for RonJobFile {
    fn load(&self) -> Result<Vec<JobRecord>, StoreError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                engine_debug!("No job list at {:?} yet", path);
                return Ok(Vec::new());
            }
            Err(err) => return Err(StoreError::Io(err)),
        };

        let state: PersistedJobs =
            ron::from_str(&content).map_err(|err| StoreError::Decode(err.to_string()))?;
        engine_info!("Loaded {} jobs from {:?}", state.recent_jobs.len(), path);
        Ok(state.recent_jobs)
    }

    fn save(&self, records: &[JobRecord]) -> Result<(), StoreError> {
        let state = PersistedJobs {
            recent_jobs: records.to_vec(),
        };
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&state, pretty)
            .map_err(|err| StoreError::Encode(err.to_string()))?;

        let writer = AtomicFileWriter::new(self.dir.clone());
        writer.write(JOBS_FILENAME, &content)?;
        engine_debug!("Saved {} jobs to {:?}", records.len(), self.path());
        Ok(())
    }
}
