use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use minomize_core::PollPolicy;
use minomize_engine::ApiSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_API_BASE_URL: &str = "MINOMIZE_API_BASE_URL";
pub const ENV_FRONTEND_BASE_URL: &str = "MINOMIZE_FRONTEND_BASE_URL";
const CONFIG_FILENAME: &str = "config.ron";
const APP_DIR: &str = "minomize";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub frontend_base_url: String,
    pub source_kind: String,
    pub source_field: String,
    pub poll_interval_secs: u64,
    pub poll_timeout_secs: u64,
    pub retention_days: u64,
    pub refresh_interval_secs: u64,
    pub history_limit: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub data_dir: Option<PathBuf>,
    /// Program used to open result pages, e.g. `xdg-open`. Unset: print the URL only.
    pub open_command: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            api_base_url: api.base_url,
            frontend_base_url: "http://localhost:3000".to_string(),
            source_kind: api.source_kind,
            source_field: api.source_field,
            poll_interval_secs: 5,
            poll_timeout_secs: 10 * 60,
            retention_days: 7,
            refresh_interval_secs: 30,
            history_limit: minomize_core::HISTORY_LIMIT,
            connect_timeout_secs: api.connect_timeout.as_secs(),
            request_timeout_secs: api.request_timeout.as_secs(),
            data_dir: None,
            open_command: None,
        }
    }
}

impl AppConfig {
    /// Reads `explicit` if given (it must exist), else the default config file if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|reason| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        ron::from_str(content).map_err(|err| err.to_string())
    }

    /// Applies environment overrides through `lookup` (normally `std::env::var`).
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(url) = lookup(ENV_FRONTEND_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.frontend_base_url = url;
        }
        self
    }

    pub fn with_overrides(mut self, api_base_url: Option<String>, data_dir: Option<PathBuf>) -> Self {
        if let Some(url) = api_base_url {
            self.api_base_url = url;
        }
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        self
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_base_url.clone(),
            source_kind: self.source_kind.clone(),
            source_field: self.source_field.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            timeout: Duration::from_secs(self.poll_timeout_secs),
        }
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days * 24 * 60 * 60)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::parse(
            r#"(api_base_url: "http://pi.local:3001", poll_interval_secs: 2)"#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "http://pi.local:3001");
        assert_eq!(config.poll_policy().interval, Duration::from_secs(2));
        assert_eq!(config.poll_policy().timeout, Duration::from_secs(600));
        assert_eq!(config.frontend_base_url, "http://localhost:3000");
        assert_eq!(config.history_limit, 5);
    }

    #[test]
    fn env_then_flags_override_file() {
        let config = AppConfig::default()
            .with_env(|key| match key {
                ENV_API_BASE_URL => Some("http://env:3001".to_string()),
                ENV_FRONTEND_BASE_URL => Some("   ".to_string()),
                _ => None,
            })
            .with_overrides(None, Some(PathBuf::from("/tmp/minomize-test")));
        assert_eq!(config.api_base_url, "http://env:3001");
        assert_eq!(config.frontend_base_url, "http://localhost:3000");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/minomize-test"));

        let config = config.with_overrides(Some("http://flag:3001".to_string()), None);
        assert_eq!(config.api_base_url, "http://flag:3001");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/minomize-test"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope.ron");
        assert!(matches!(
            AppConfig::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.ron");
        fs::write(&path, "(api_base_url: 42)").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn retention_is_seven_days_by_default() {
        assert_eq!(AppConfig::default().retention(), minomize_core::RETENTION_WINDOW);
    }
}
