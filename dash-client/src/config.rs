use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::registry::Overview;

pub const CONFIG_ENV: &str = "DASH_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Runtime settings, read from YAML and overridden by command-line flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// kubeconfig context; `None` uses the current one.
    pub context: Option<String>,
    pub namespace: Option<String>,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub overview: Overview,
    /// Seconds to wait for a watcher's initial list.
    pub sync_timeout_secs: u64,
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            context: None,
            namespace: None,
            log_dir: std::env::temp_dir().join("dash"),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            overview: Overview::Cluster,
            sync_timeout_secs: 30,
            source: None,
        }
    }
}

impl DashConfig {
    /// Load `explicit` if given, otherwise the first discovered config file,
    /// otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit.map(Path::to_path_buf).or_else(discover_config_path) {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let cwd_candidates = [PathBuf::from("dash.yaml"), PathBuf::from("dash.yml")];
    if let Some(found) = cwd_candidates.into_iter().find(|c| c.exists()) {
        return Some(found);
    }

    let home = std::env::var("HOME").ok()?;
    [
        PathBuf::from(&home).join(".config/dash/config.yaml"),
        PathBuf::from(&home).join(".config/dash/config.yml"),
    ]
    .into_iter()
    .find(|c| c.exists())
}
